#[cfg(target_os = "linux")]
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
#[cfg(target_os = "linux")]
use i2cdev::core::I2CDevice;
use std::path::Path;
use thiserror::Error;

/// sysfs directory that only exists when the kernel exposes at least one I2C adapter
pub const I2C_ADAPTER_SYSFS: &str = "/sys/class/i2c-adapter";

/// I2C bus error type
#[derive(Error, Debug)]
pub enum I2CError {
    #[cfg(target_os = "linux")]
    #[error(transparent)]
    Device(#[from] LinuxI2CError),

    #[error("short read from register {reg:#04x}: expected {expected} bytes, got {actual}")]
    ShortRead { reg: u8, expected: usize, actual: usize },

    #[error("I2C not supported on this platform: {0}")]
    Unsupported(String),
}

/// Returns true when the platform exposes an I2C adapter that a real sensor could sit on
pub fn adapter_present() -> bool {
    Path::new(I2C_ADAPTER_SYSFS).exists()
}

/// I2C bus implementation
#[cfg(target_os = "linux")]
pub struct I2CBus {
    device: LinuxI2CDevice,
    path: String,
}

#[cfg(not(target_os = "linux"))]
pub struct I2CBus {
    path: String,
}

#[cfg(target_os = "linux")]
impl I2CBus {
    pub fn new(path: &str) -> Result<Self, I2CError> {
        let device = LinuxI2CDevice::new(path, 0)?;
        Ok(Self { device, path: path.to_string() })
    }

    pub async fn read_bytes(&mut self, address: u8, reg: u8, buf: &mut [u8]) -> Result<(), I2CError> {
        self.device.set_slave_address(address as u16)?;

        if buf.len() == 1 {
            buf[0] = self.device.smbus_read_byte_data(reg)?;
        } else {
            let block = self.device.smbus_read_i2c_block_data(reg, buf.len() as u8)?;
            if block.len() != buf.len() {
                return Err(I2CError::ShortRead { reg, expected: buf.len(), actual: block.len() });
            }
            buf.copy_from_slice(&block);
        }

        Ok(())
    }

    pub async fn write_byte(&mut self, address: u8, reg: u8, byte: u8) -> Result<(), I2CError> {
        self.device.set_slave_address(address as u16)?;
        self.device.smbus_write_byte_data(reg, byte)?;
        Ok(())
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(not(target_os = "linux"))]
impl I2CBus {
    pub fn new(path: &str) -> Result<Self, I2CError> {
        Err(I2CError::Unsupported(format!("cannot open {}, I2C is only supported on Linux", path)))
    }

    pub async fn read_bytes(&mut self, _address: u8, _reg: u8, _buf: &mut [u8]) -> Result<(), I2CError> {
        Err(I2CError::Unsupported("I2C is only supported on Linux".to_string()))
    }

    pub async fn write_byte(&mut self, _address: u8, _reg: u8, _byte: u8) -> Result<(), I2CError> {
        Err(I2CError::Unsupported("I2C is only supported on Linux".to_string()))
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}
