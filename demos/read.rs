use std::time::Duration;

use sirf_serial::transport::IoTransport;
use sirf_serial::{FrameError, Port};

const PORT_NAME: &'static str = "/dev/ttyUSB0";

fn main() {
    let port = serialport::new(PORT_NAME, 4_800)
        .timeout(Duration::from_millis(100))
        .open();

    match port {
        Ok(port) => {
            let mut port = Port::new(IoTransport::new(port));
            loop {
                match port.read_nmea() {
                    Ok(message) => match message.as_str() {
                        Some(sentence) => println!("${}", sentence),
                        None => println!("non UTF-8 sentence {:02x?}", message.body()),
                    },
                    // nothing on the line, keep waiting
                    Err(FrameError::SyncTimeout) => (),
                    Err(e) => eprintln!("{} ({:?})", e.status_code(), e),
                }
            }
        }
        Err(e) => {
            eprintln!("Failed to open \"{}\". Error: {}", PORT_NAME, e);
            ::std::process::exit(1);
        }
    }
}
