// Device discovery example
//
// Lists every Raspberry Pi board that shows up as a USB serial port.

use pico_la_rs::PicoConnector;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let devices = PicoConnector::get_available_devices()?;

    if devices.is_empty() {
        println!("No Pico devices found. Please connect a device and try again.");
        return Ok(());
    }

    println!("Found {} device(s):", devices.len());
    for (i, device) in devices.iter().enumerate() {
        println!("  {}. {} at {}", i + 1, device.name, device.port);
    }

    Ok(())
}
