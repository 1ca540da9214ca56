//! Audio device capture feeding the visualizer's analyzer tap.
//!
//! Opens one cpal stream (an input, or an output device for loopback capture),
//! downmixes every callback block to mono and hands it to each registered
//! [`MixObserver`]. Observers registered after the stream started receive all
//! later blocks, so late-starting playback is still observed.

use ambient_viz_core::{MixObserver, OutputRouter, TapError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::utils::Config;

type Observers = Arc<Mutex<Vec<Box<dyn MixObserver>>>>;

pub struct DeviceInfo {
    pub device: cpal::Device,
    pub name: String,
    pub is_input: bool,
}

impl DeviceInfo {
    fn kind(&self) -> &'static str {
        if self.is_input {
            "input"
        } else {
            "output"
        }
    }
}

/// Chosen device name and direction, as saved in the config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceKey<'a> {
    pub name: &'a str,
    pub is_input: bool,
}

/// Routing capability backed by a live capture stream
pub struct CaptureRouter {
    observers: Observers,
    device_name: Option<String>,
    device_is_input: bool,
    stream: Option<Stream>,
}

impl CaptureRouter {
    pub fn new(config: &Config) -> Self {
        let devices = Self::collect_devices();
        let observers: Observers = Arc::new(Mutex::new(Vec::new()));

        if devices.is_empty() {
            warn!("No audio devices found");
            return Self {
                observers,
                device_name: None,
                device_is_input: false,
                stream: None,
            };
        }

        let host = cpal::default_host();
        let default_output = host.default_output_device().and_then(|d| d.name().ok());
        let names: Vec<DeviceKey> = devices
            .iter()
            .map(|d| DeviceKey {
                name: &d.name,
                is_input: d.is_input,
            })
            .collect();
        let index = choose_device(&names, saved_device(config), default_output.as_deref());

        let info = &devices[index];
        let timeout = Duration::from_secs(config.device_timeout_secs());
        let stream = Self::build_stream(info, Arc::clone(&observers), timeout);
        let device_name = match stream {
            Some(_) => {
                info!("[{}] Capturing: {} ({})", index, info.name, info.kind());
                Some(info.name.clone())
            }
            None => {
                warn!("[{}] Could not open {} ({})", index, info.name, info.kind());
                None
            }
        };

        Self {
            observers,
            device_name,
            device_is_input: info.is_input,
            stream,
        }
    }

    /// The device a stream is running on, if any
    pub fn device(&self) -> Option<DeviceKey<'_>> {
        self.device_name.as_deref().map(|name| DeviceKey {
            name,
            is_input: self.device_is_input,
        })
    }

    pub fn list_devices() {
        for (idx, info) in Self::collect_devices().iter().enumerate() {
            debug!("  [{}] {} ({})", idx, info.name, info.kind());
        }
    }

    fn collect_devices() -> Vec<DeviceInfo> {
        let host = cpal::default_host();
        let mut devices = Vec::new();

        if let Ok(input_devices) = host.input_devices() {
            for device in input_devices {
                if let Ok(name) = device.name() {
                    devices.push(DeviceInfo {
                        device,
                        name,
                        is_input: true,
                    });
                }
            }
        }

        if let Ok(output_devices) = host.output_devices() {
            for device in output_devices {
                if let Ok(name) = device.name() {
                    devices.push(DeviceInfo {
                        device,
                        name,
                        is_input: false,
                    });
                }
            }
        }

        devices
    }

    /// Get device config with timeout (the config call often hangs on bad devices)
    fn get_config_with_timeout(
        device: &Device,
        is_input: bool,
        timeout: Duration,
    ) -> Option<StreamConfig> {
        let device_clone = device.clone();
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let config = if is_input {
                device_clone.default_input_config()
            } else {
                device_clone.default_output_config()
            };
            let _ = tx.send(config);
        });

        match rx.recv_timeout(timeout) {
            Ok(Ok(config)) => Some(config.into()),
            Ok(Err(e)) => {
                warn!("Failed to get device config: {}", e);
                None
            }
            Err(_) => {
                warn!("Device config timed out after {:?}", timeout);
                None
            }
        }
    }

    fn build_stream(
        device_info: &DeviceInfo,
        observers: Observers,
        timeout: Duration,
    ) -> Option<Stream> {
        let stream_config =
            Self::get_config_with_timeout(&device_info.device, device_info.is_input, timeout)?;
        let channels = usize::from(stream_config.channels).max(1);
        let mut mono = Vec::new();

        let err_fn = |err| error!("Audio stream error: {}", err);

        let stream = device_info.device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                downmix(data, channels, &mut mono);
                let mut observers = observers.lock().unwrap_or_else(PoisonError::into_inner);
                for observer in observers.iter_mut() {
                    observer.observe(&mono);
                }
            },
            err_fn,
            None,
        );

        match stream {
            Ok(s) => {
                if let Err(e) = s.play() {
                    warn!("Failed to play stream: {}", e);
                    return None;
                }
                Some(s)
            }
            Err(e) => {
                warn!("Failed to build stream: {}", e);
                None
            }
        }
    }
}

impl OutputRouter for CaptureRouter {
    fn tap_output(&mut self, observer: Box<dyn MixObserver>) -> Result<(), TapError> {
        if self.stream.is_none() {
            return Err(TapError::AudioUnavailable(
                "no capture stream is running".to_string(),
            ));
        }
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
        Ok(())
    }
}

/// Average interleaved frames into `mono`, reusing its allocation
fn downmix(data: &[f32], channels: usize, mono: &mut Vec<f32>) {
    mono.clear();
    mono.extend(
        data.chunks(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32),
    );
}

/// Device remembered from the last session
fn saved_device(config: &Config) -> Option<DeviceKey<'_>> {
    config.last_device.as_deref().map(|name| DeviceKey {
        name,
        is_input: config.last_device_is_input.unwrap_or(false),
    })
}

/// Pick the capture device: the saved one, else a pipewire or pulse input,
/// else the default output for loopback, else the first device
fn choose_device(
    devices: &[DeviceKey],
    saved: Option<DeviceKey>,
    default_output: Option<&str>,
) -> usize {
    saved
        .and_then(|key| devices.iter().position(|d| *d == key))
        .or_else(|| devices.iter().position(|d| d.is_input && d.name == "pipewire"))
        .or_else(|| devices.iter().position(|d| d.is_input && d.name == "pulse"))
        .or_else(|| {
            default_output
                .and_then(|name| devices.iter().position(|d| !d.is_input && d.name == name))
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str, is_input: bool) -> DeviceKey<'_> {
        DeviceKey { name, is_input }
    }

    #[test]
    fn test_downmix_averages_channels() {
        let mut mono = vec![9.0; 8];
        downmix(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2, &mut mono);
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);

        downmix(&[0.25, 0.75], 1, &mut mono);
        assert_eq!(mono, vec![0.25, 0.75]);
    }

    #[test]
    fn test_saved_device_wins() {
        let devices = [key("pulse", true), key("Speakers", false), key("USB", true)];
        assert_eq!(
            choose_device(&devices, Some(key("USB", true)), Some("Speakers")),
            2
        );
        // Same name, other direction does not match
        assert_eq!(
            choose_device(&devices, Some(key("USB", false)), Some("Speakers")),
            0
        );
    }

    #[test]
    fn test_fallback_order() {
        let devices = [key("hw:0", true), key("pulse", true), key("pipewire", true)];
        assert_eq!(choose_device(&devices, None, None), 2);

        let devices = [key("hw:0", true), key("Speakers", false)];
        assert_eq!(choose_device(&devices, None, Some("Speakers")), 1);
        assert_eq!(choose_device(&devices, None, None), 0);
    }

    #[test]
    fn test_remembered_device_is_chosen_next_launch() {
        let mut config = Config::default();
        assert!(config.remember_device("USB", true));
        assert!(!config.remember_device("USB", true));

        let text = toml::to_string(&config).expect("serializes");
        let reloaded = Config::parse(&text).expect("parses");
        assert_eq!(saved_device(&reloaded), Some(key("USB", true)));

        let devices = [key("pipewire", true), key("Speakers", false), key("USB", true)];
        assert_eq!(
            choose_device(&devices, saved_device(&reloaded), Some("Speakers")),
            2
        );
    }
}
