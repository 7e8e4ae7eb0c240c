use std::env;

use fpm383::{Config, EnrollStatus, Fpm383};

mod pc_utils;
use pc_utils::{init_logging, open_port, print_ports, HostDelay};

const DEFAULT_CAPTURES: u8 = 4;

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => print_ports(),
        2 => print_template_num(args[1].as_str()),
        3 => enroll_to_id(args[1].as_str(), args[2].parse::<u16>().unwrap(), DEFAULT_CAPTURES),
        4 => enroll_to_id(
            args[1].as_str(),
            args[2].parse::<u16>().unwrap(),
            args[3].parse::<u8>().unwrap(),
        ),
        _ => panic!("Usage: pc_enrollment [port_name] [slot_id] [captures]"),
    };
}

fn print_template_num(port_name: &str) {
    let transport = open_port(port_name).unwrap();
    let mut fpm = Fpm383::new(transport, HostDelay, Config::default());
    let result = fpm.template_num();
    println!(
        "[{:?}] Valid templates: {:?}",
        result.confirmation_code, result.template_num
    );
}

fn enroll_to_id(port_name: &str, slot_id: u16, captures: u8) {
    let transport = open_port(port_name).unwrap();
    let mut fpm = Fpm383::new(transport, HostDelay, Config::default());

    println!("Press the same finger {} times", captures);
    match fpm.enroll(slot_id, captures) {
        EnrollStatus::Enrolled => println!("Stored in slot {}", slot_id),
        EnrollStatus::AlreadyEnrolled => println!("Slot {} is already in use", slot_id),
        EnrollStatus::Failed(result) => {
            println!("Enrollment failed: {:?}", result);
            println!("Cancel: {:?}", fpm.cancel());
        }
    }
}
