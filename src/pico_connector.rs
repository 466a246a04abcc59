use serialport::{SerialPort, SerialPortType};

use crate::config::SessionConfig;
use crate::pico_analyzer::PicoAnalyzer;

/// USB vendor id of Raspberry Pi boards.
pub const PICO_VENDOR_ID: u16 = 0x2E8A;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PicoDevice {
    pub name: String,
    pub port: String,
}

impl PicoDevice {
    pub fn new(name: String, port: String) -> Self {
        Self { name, port }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PicoConnectorError {
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    #[error("No Pico logic analyzer found. Please connect one or specify the port manually")]
    DeviceNotFound,
}

/// Finds and opens analyzers on the local serial ports.
pub struct PicoConnector;

impl PicoConnector {
    /// Open the port named in `config`, or the first discovered analyzer.
    pub fn connect(
        config: &SessionConfig,
    ) -> Result<PicoAnalyzer<Box<dyn SerialPort>>, PicoConnectorError> {
        let port = match &config.port {
            Some(port) => port.clone(),
            None => Self::get_device_port()?,
        };
        log::debug!("Connecting to Pico on port {} at {} baud", port, config.baud_rate);

        let serial = serialport::new(&port, config.baud_rate)
            .timeout(config.poll_interval)
            .open()?;
        // drop anything the firmware printed before we were listening
        serial.clear(serialport::ClearBuffer::All)?;

        Ok(PicoAnalyzer::from_config(serial, config))
    }

    /// All USB serial ports that belong to a Raspberry Pi board.
    pub fn get_available_devices() -> Result<Vec<PicoDevice>, PicoConnectorError> {
        let devices = serialport::available_ports()?
            .into_iter()
            .filter_map(|info| match info.port_type {
                SerialPortType::UsbPort(usb) if usb.vid == PICO_VENDOR_ID => {
                    let name = usb.product.unwrap_or_else(|| "Pico".to_string());
                    Some(PicoDevice::new(name, info.port_name))
                }
                _ => None,
            })
            .collect();
        Ok(devices)
    }

    fn get_device_port() -> Result<String, PicoConnectorError> {
        log::debug!("Searching for a Pico logic analyzer");

        Self::get_available_devices()?
            .into_iter()
            .next()
            .map(|device| device.port)
            .ok_or(PicoConnectorError::DeviceNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_available_devices() {
        // depends on what is plugged into the machine running the tests
        match PicoConnector::get_available_devices() {
            Ok(devices) => {
                for device in devices {
                    assert!(!device.name.is_empty());
                    assert!(!device.port.is_empty());
                }
            }
            Err(PicoConnectorError::SerialPort(_)) => {
                // enumeration is unavailable in some sandboxes
            }
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    #[test]
    fn test_connect_to_missing_port() {
        let config = SessionConfig::new().with_port("/dev/this-port-does-not-exist");
        assert!(matches!(
            PicoConnector::connect(&config),
            Err(PicoConnectorError::SerialPort(_))
        ));
    }
}
