use std::env;

use fpm383::{Colors, Config, Fpm383, Pattern};

mod pc_utils;
use pc_utils::{init_logging, open_port, print_ports, HostDelay};

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => print_ports(),
        2 => run(args[1].as_str()),
        _ => panic!("Usage: pc_device_info [port_name]"),
    };
}

fn run(port_name: &str) {
    let transport = open_port(port_name).unwrap();
    let mut fpm = Fpm383::new(transport, HostDelay, Config::default());

    println!("1. Reading system parameters");
    let result = fpm.read_sys_para();
    match result.system_parameters {
        Some(params) => {
            println!("{:#?}", params);
            println!("Busy: {}", params.busy());
            println!("Baud rate: {}", params.baud_rate());
        }
        None => println!("No parameters: {:?}", result.confirmation_code),
    }

    println!("2. Reading chip serial number");
    let result = fpm.chip_sn();
    match result.serial_number {
        Some(sn) => println!("Serial: {:02x?}", sn),
        None => println!("No serial: {:?}", result.confirmation_code),
    }

    println!("3. Counting templates");
    let result = fpm.template_num();
    println!("[{:?}] {:?}", result.confirmation_code, result.template_num);

    println!("4. Cycling the LED");
    fpm.indicator(Pattern::breathe(Colors::BLUE, Colors::RED | Colors::GREEN, 3));

    println!("5. Going to sleep: {:?}", fpm.sleep());
}
