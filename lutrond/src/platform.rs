// Holds the lights presented to the host and drives the host's
// refresh cycle. Each poll refreshes every light and logs the ones
// whose state changed since the previous poll. Since the controller
// can be changed by keypads and other integrations, polling is the
// only way to stay in sync.

use lutron_api::{device::Output, Result};
use lutron_drv_light::Light;
use tracing::{info, warn};

// The state of a light as the host sees it: whether it's on and its
// brightness.

type State = (bool, i32);

pub struct Platform<O: Output> {
    lights: Vec<(Light<O>, Option<State>)>,
}

impl<O: Output> Platform<O> {
    pub fn new(lights: Vec<Light<O>>) -> Self {
        Platform {
            lights: lights.into_iter().map(|l| (l, None)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    fn refresh(light: &mut Light<O>) -> Result<State> {
        light.update()?;

        let brightness = light.brightness()?;

        Ok((light.is_on()?, brightness))
    }

    /// Refreshes every light. Returns the number of lights whose
    /// state changed. A light that can't be read is skipped until
    /// the next poll.
    pub fn poll(&mut self) -> usize {
        let mut changed = 0;

        for (light, current) in self.lights.iter_mut() {
            match Self::refresh(light) {
                Ok(state) => {
                    if *current != Some(state) {
                        info!(
                            "{}: on {} brightness {} (prev {:?}) {:?}",
                            light.name(),
                            state.0,
                            state.1,
                            light.prev_brightness(),
                            light.device_state_attributes()
                        );
                        *current = Some(state);
                        changed += 1
                    }
                }
                Err(e) => warn!("couldn't refresh '{}' : {}", light.name(), e),
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::Platform;
    use crate::memory::{config, Memory};
    use lutron_api::device::{Controller, Output};
    use lutron_drv_light::setup_platform;

    fn mk_memory() -> Memory {
        Memory::create(&config::Params {
            outputs: vec![
                config::Entry {
                    area: "Kitchen".into(),
                    name: "Pendants".into(),
                    id: 12,
                    dimmable: true,
                    level: 0.0,
                },
                config::Entry {
                    area: "Den".into(),
                    name: "Lamp".into(),
                    id: 13,
                    dimmable: true,
                    level: 50.0,
                },
            ],
        })
        .expect("controller should be created")
    }

    #[test]
    fn test_poll() {
        let mem = mk_memory();
        let mut platform =
            Platform::new(setup_platform(&mem).expect("setup failed"));

        assert_eq!(platform.len(), 2);

        // The first poll reports every light. After that, only
        // changes are reported.

        assert_eq!(platform.poll(), 2);
        assert_eq!(platform.poll(), 0);

        // Simulate a keypad changing a light behind the host's back.

        let mut pendants = mem.lights().unwrap().remove(0).1;

        assert!(pendants.set_level(100.0).is_ok());
        assert_eq!(platform.poll(), 1);
        assert_eq!(platform.poll(), 0);
    }

    #[test]
    fn test_poll_tracks_turn_on() {
        let mem = mk_memory();
        let mut lights = setup_platform(&mem).expect("setup failed");

        // The dark light was seeded with zero, so turning it on uses
        // the default brightness. The lit light restores what it had.

        assert_eq!(lights[0].prev_brightness(), Some(0.0));
        assert_eq!(lights[1].prev_brightness(), Some(127.0));

        assert!(lights[0].turn_on(None).is_ok());
        assert!(lights[1].turn_off().is_ok());
        assert!(lights[1].turn_on(None).is_ok());

        let outputs = mem.lights().unwrap();

        assert_eq!(outputs[0].1.level(), Ok(50.0));
        assert_eq!(outputs[1].1.level(), Ok(127.0 * 100.0 / 255.0));

        let mut platform = Platform::new(lights);

        assert_eq!(platform.poll(), 2);
    }
}
