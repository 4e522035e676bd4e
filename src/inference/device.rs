use candle_core::Device;

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::{info, warn};

#[cfg(not(any(feature = "metal", feature = "cuda")))]
use tracing::debug;

use super::error::InferenceError;

/// Selects the compute device based on enabled features (falls back to CPU).
pub fn select_device() -> Result<Device, InferenceError> {
    #[cfg(any(feature = "metal", feature = "cuda"))]
    {
        let mut failures: Vec<String> = Vec::new();

        #[cfg(feature = "metal")]
        {
            match Device::new_metal(0) {
                Ok(device) => {
                    info!("Scoring model on Metal GPU");
                    return Ok(device);
                }
                Err(e) => {
                    warn!(error = %e, "Metal device unavailable");
                    failures.push(format!("metal failed: {e}"));
                }
            }
        }

        #[cfg(feature = "cuda")]
        {
            match Device::new_cuda(0) {
                Ok(device) => {
                    info!("Scoring model on CUDA GPU");
                    return Ok(device);
                }
                Err(e) => {
                    warn!(error = %e, "CUDA device unavailable");
                    failures.push(format!("cuda failed: {e}"));
                }
            }
        }

        let reason = failures.join("; ");
        warn!(reason = %reason, "Falling back to CPU device");
        Ok(Device::Cpu)
    }

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    {
        debug!("No GPU backend compiled, scoring on CPU");
        Ok(Device::Cpu)
    }
}
