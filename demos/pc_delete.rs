use std::env;

use fpm383::{Config, Fpm383};

mod pc_utils;
use pc_utils::{init_logging, open_port, print_ports, HostDelay};

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => print_ports(),
        2 => erase_all(args[1].as_str()),
        3 => delete_id(args[1].as_str(), args[2].parse::<u16>().unwrap()),
        _ => panic!("Usage: pc_delete [port_name] [slot_id]"),
    };
}

fn erase_all(port_name: &str) {
    let transport = open_port(port_name).unwrap();
    let mut fpm = Fpm383::new(transport, HostDelay, Config::default());
    println!("Erase all: {:?}", fpm.empty());
}

fn delete_id(port_name: &str, slot_id: u16) {
    let transport = open_port(port_name).unwrap();
    let mut fpm = Fpm383::new(transport, HostDelay, Config::default());
    println!("Delete slot {}: {:?}", slot_id, fpm.delete(slot_id));
}
