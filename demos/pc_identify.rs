use std::env;

use fpm383::{Config, Fpm383, IdentifyOutcome};

mod pc_utils;
use pc_utils::{init_logging, open_port, print_ports, HostDelay};

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => print_ports(),
        2 => identify(args[1].as_str()),
        _ => panic!("Usage: pc_identify [port_name]"),
    };
}

fn identify(port_name: &str) {
    let transport = open_port(port_name).unwrap();
    let config = Config::default().with_no_finger_indicator(true);
    let mut fpm = Fpm383::new(transport, HostDelay, config);

    println!("Place a finger on the sensor");
    loop {
        match fpm.identify() {
            IdentifyOutcome::NoFinger => print!("."),
            IdentifyOutcome::Matched { slot_id, score } => {
                println!();
                println!("Matched slot {} (score {:?})", slot_id, score);
                break;
            }
            IdentifyOutcome::NotFound => {
                println!();
                println!("Finger not enrolled");
                break;
            }
            other => {
                println!();
                println!("Identification failed: {:?}", other);
                break;
            }
        }
    }
}
