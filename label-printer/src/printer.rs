//! Printer discovery
//!
//! Supports:
//! - Windows default printer (via Win32 API)
//! - CUPS default destination (`lpstat -d`) elsewhere
//! - A fixed, configured printer name

use tracing::{debug, instrument};

use crate::error::{PrintError, PrintResult};

/// Source of the printer name jobs are sent to
pub trait PrinterLocator: Send + Sync {
    /// Name of the printer to target
    fn default_printer(&self) -> PrintResult<String>;
}

/// Always returns the configured name
#[derive(Debug, Clone)]
pub struct FixedPrinterLocator {
    name: String,
}

impl FixedPrinterLocator {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl PrinterLocator for FixedPrinterLocator {
    fn default_printer(&self) -> PrintResult<String> {
        Ok(self.name.clone())
    }
}

/// Asks the operating system for its default printer
#[derive(Debug, Clone, Default)]
pub struct SystemPrinterLocator;

impl PrinterLocator for SystemPrinterLocator {
    #[instrument(skip(self))]
    fn default_printer(&self) -> PrintResult<String> {
        #[cfg(windows)]
        let name = WindowsPrinter::default_printer()?;

        #[cfg(not(windows))]
        let name = lpstat_default()?;

        debug!(printer = ?name, "Default printer lookup");
        name.ok_or_else(|| PrintError::Printer("no default printer is configured".to_string()))
    }
}

/// Parse the output of `lpstat -d`
#[cfg_attr(windows, allow(dead_code))]
fn parse_lpstat_default(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (_, name) = line.split_once("system default destination:")?;
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    })
}

#[cfg(not(windows))]
fn lpstat_default() -> PrintResult<Option<String>> {
    let output = std::process::Command::new("lpstat")
        .arg("-d")
        .output()
        .map_err(|e| PrintError::Printer(format!("lpstat unavailable: {}", e)))?;

    Ok(parse_lpstat_default(&String::from_utf8_lossy(&output.stdout)))
}

/// Windows driver printer
///
/// Uses Win32 API to query installed printer drivers.
#[cfg(windows)]
pub struct WindowsPrinter;

#[cfg(windows)]
impl WindowsPrinter {
    /// Get the default printer name
    pub fn default_printer() -> PrintResult<Option<String>> {
        use windows::Win32::Graphics::Printing::GetDefaultPrinterW;
        use windows::core::PWSTR;

        unsafe {
            let mut needed: u32 = 0;
            let _ = GetDefaultPrinterW(None, &mut needed);

            if needed == 0 {
                return Ok(None);
            }

            let mut buf: Vec<u16> = vec![0; needed as usize];
            let ok = GetDefaultPrinterW(Some(PWSTR(buf.as_mut_ptr())), &mut needed);

            if !ok.as_bool() {
                return Ok(None);
            }

            let name = PWSTR(buf.as_mut_ptr())
                .to_string()
                .map_err(|e| PrintError::WindowsPrinter(format!("UTF-16 decode failed: {}", e)))?;

            Ok(Some(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_locator() {
        let locator = FixedPrinterLocator::new("Label 7x5");
        assert_eq!(locator.default_printer().unwrap(), "Label 7x5");
    }

    #[test]
    fn test_parse_lpstat_default() {
        assert_eq!(
            parse_lpstat_default("system default destination: Zebra_GK420d\n"),
            Some("Zebra_GK420d".to_string())
        );
        assert_eq!(parse_lpstat_default("no system default destination\n"), None);
        assert_eq!(parse_lpstat_default(""), None);
    }
}
