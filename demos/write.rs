use std::time::Duration;

use sirf_serial::nmea::NmeaCommand;
use sirf_serial::osp::OspCommand;
use sirf_serial::transport::IoTransport;
use sirf_serial::Port;

const PORT_NAME: &'static str = "/dev/ttyUSB0";

fn main() {
    let port = serialport::new(PORT_NAME, 4_800)
        .timeout(Duration::from_millis(100))
        .open();

    match port {
        Ok(port) => {
            let mut port = Port::new(IoTransport::new(port));

            // switch the receiver from NMEA to OSP at 9600 baud
            if let Err(e) = port.write_nmea_command(&NmeaCommand::new(100, "0,9600,8,1,0")) {
                eprintln!("{}", e);
                ::std::process::exit(1);
            }
            if let Err(e) = port.transport_mut().get_mut().set_baud_rate(9_600) {
                eprintln!("Failed to change baud rate. Error: {}", e);
                ::std::process::exit(1);
            }

            // poll software version
            if let Err(e) = port.write_osp_command(&OspCommand::new(0x84, "00")) {
                eprintln!("{}", e);
                ::std::process::exit(1);
            }
            loop {
                match port.read_osp() {
                    Ok(message) if message.message_id() == 0x06 => {
                        println!("software version {:02x?}", message.data());
                        break;
                    }
                    Ok(message) => println!("message id {:#04x}", message.message_id()),
                    Err(e) => eprintln!("{}", e),
                }
            }
        }
        Err(e) => {
            eprintln!("Failed to open \"{}\". Error: {}", PORT_NAME, e);
            ::std::process::exit(1);
        }
    }
}
