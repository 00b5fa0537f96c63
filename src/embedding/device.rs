use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::EmbeddingError;

/// Picks the compute device for model inference.
///
/// GPU backends compiled in via the `metal` / `cuda` features are tried in that
/// order; CPU is always the last resort.
pub fn select_device() -> Result<Device, EmbeddingError> {
    #[cfg_attr(not(any(feature = "metal", feature = "cuda")), allow(unused_mut))]
    let mut attempts: Vec<(&'static str, Result<Device, candle_core::Error>)> = Vec::new();

    #[cfg(feature = "metal")]
    attempts.push(("metal", Device::new_metal(0)));

    #[cfg(feature = "cuda")]
    attempts.push(("cuda", Device::new_cuda(0)));

    if attempts.is_empty() {
        debug!("No GPU backend compiled, using CPU");
        return Ok(Device::Cpu);
    }

    let mut failures = Vec::with_capacity(attempts.len());
    for (backend, attempt) in attempts {
        match attempt {
            Ok(device) => {
                info!(backend, "Using GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                warn!(backend, error = %e, "GPU device unavailable");
                failures.push(format!("{backend}: {e}"));
            }
        }
    }

    warn!(reason = %failures.join("; "), "Falling back to CPU device");
    Ok(Device::Cpu)
}
