//! Compute device selection for the local encoder.

use std::fmt;
use std::str::FromStr;

use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::EmbeddingError;

/// Which device the MiniLM encoder should run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    /// First compiled-in GPU that opens, else CPU.
    #[default]
    Auto,
    /// Always CPU, even in GPU builds.
    Cpu,
    /// Metal only; fails if not compiled in or not present.
    Metal,
    /// CUDA only; fails if not compiled in or not present.
    Cuda,
}

impl DevicePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            DevicePreference::Auto => "auto",
            DevicePreference::Cpu => "cpu",
            DevicePreference::Metal => "metal",
            DevicePreference::Cuda => "cuda",
        }
    }
}

impl fmt::Display for DevicePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DevicePreference {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(DevicePreference::Auto),
            "cpu" => Ok(DevicePreference::Cpu),
            "metal" => Ok(DevicePreference::Metal),
            "cuda" | "gpu" => Ok(DevicePreference::Cuda),
            other => Err(EmbeddingError::InvalidConfig {
                reason: format!("unknown device '{other}': expected auto, cpu, metal or cuda"),
            }),
        }
    }
}

/// Opens the device named by `preference`.
///
/// `Auto` never fails: it tries each compiled-in GPU and settles on CPU. An
/// explicit `Metal`/`Cuda` request fails with [`EmbeddingError::DeviceUnavailable`]
/// instead of silently running on CPU.
pub fn resolve_device(preference: DevicePreference) -> Result<Device, EmbeddingError> {
    match preference {
        DevicePreference::Cpu => {
            debug!("Encoder pinned to CPU");
            Ok(Device::Cpu)
        }
        DevicePreference::Metal => open_metal(),
        DevicePreference::Cuda => open_cuda(),
        DevicePreference::Auto => {
            let openers: [fn() -> Result<Device, EmbeddingError>; 2] = [open_metal, open_cuda];
            let mut failures = Vec::new();
            for open in openers {
                match open() {
                    Ok(device) => return Ok(device),
                    Err(EmbeddingError::DeviceUnavailable { device, reason }) => {
                        failures.push(format!("{device}: {reason}"));
                    }
                    Err(other) => return Err(other),
                }
            }

            if cfg!(any(feature = "metal", feature = "cuda")) {
                warn!(reason = %failures.join("; "), "Encoder falling back to CPU");
            } else {
                debug!("CPU-only build, encoder on CPU");
            }
            Ok(Device::Cpu)
        }
    }
}

fn unavailable(device: &str, reason: impl Into<String>) -> EmbeddingError {
    EmbeddingError::DeviceUnavailable {
        device: device.to_string(),
        reason: reason.into(),
    }
}

fn open_metal() -> Result<Device, EmbeddingError> {
    if !cfg!(feature = "metal") {
        return Err(unavailable("metal", "not compiled in (enable the `metal` feature)"));
    }

    let device = Device::new_metal(0).map_err(|e| unavailable("metal", e.to_string()))?;
    info!("Encoder using Metal GPU");
    Ok(device)
}

fn open_cuda() -> Result<Device, EmbeddingError> {
    if !cfg!(feature = "cuda") {
        return Err(unavailable("cuda", "not compiled in (enable the `cuda` feature)"));
    }

    let device = Device::new_cuda(0).map_err(|e| unavailable("cuda", e.to_string()))?;
    info!("Encoder using CUDA GPU");
    Ok(device)
}
