// An adapter which presents a Lutron output as a light to the host.
// The host works with brightness values in the range 0..=255 while
// the Lutron controller uses levels in the range 0.0..=100.0.
//
// Lutron outputs only report a level; "off" is a level of 0.0. To
// make "turn on" restore the last dimming level, the adapter
// remembers the last non-zero brightness it saw or applied.
//
//  Turning on with no brightness:
//
//   previous brightness known:   level = to_lutron(previous)
//   previous brightness unknown: level = to_lutron(127.5) = 50.0
//
//  Turning off:
//
//   level = 0.0 (previous brightness is kept)

use lutron_api::{
    device::{Controller, Output},
    Result,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

mod level;

pub use level::{to_hass_level, to_lutron_level};

/// Feature flag telling the host the light can be dimmed. It's the
/// only feature a Lutron light supports.
pub const SUPPORT_BRIGHTNESS: u32 = 1;

const ATTR_INTEGRATION_ID: &str = "lutron_integration_id";

// Brightness used when turning on a light that has no useful
// previous brightness. It's the midpoint of the host's scale and
// isn't rounded.

const DEFAULT_BRIGHTNESS: f64 = 255.0 / 2.0;

// Where `turn_on()` got its brightness from. Only used in log
// messages.

#[derive(Debug, Clone, Copy, PartialEq)]
enum Source {
    Attrs,
    Default,
    Previous,
}

impl Source {
    fn as_str(&self) -> &'static str {
        match self {
            Source::Attrs => "attrs",
            Source::Default => "default",
            Source::Previous => "previous",
        }
    }
}

// Picks the brightness to use when turning on a light. A requested
// brightness is only honored by dimmers. An unknown previous
// brightness is treated like a previous brightness of 0.

fn select_brightness(
    requested: Option<i32>,
    dimmable: bool,
    prev: Option<f64>,
) -> (f64, Source) {
    match (requested, prev) {
        (Some(v), _) if dimmable => (v as f64, Source::Attrs),
        (_, Some(p)) if p != 0.0 => (p, Source::Previous),
        _ => (DEFAULT_BRIGHTNESS, Source::Default),
    }
}

/// A Lutron output presented as a light.
pub struct Light<O: Output> {
    area: String,
    device: O,
    prev_brightness: Option<f64>,
}

impl<O: Output> Light<O> {
    /// Creates a light for the output `device` which lives in the
    /// area named `area`. The previous brightness is unknown until
    /// the first call to `update()`, `brightness()` or `turn_on()`.
    pub fn new(area: impl Into<String>, device: O) -> Self {
        Light {
            area: area.into(),
            device,
            prev_brightness: None,
        }
    }

    /// The name the host should display: the area followed by the
    /// output's name.
    pub fn name(&self) -> String {
        format!("{} {}", &self.area, self.device.name())
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn integration_id(&self) -> u32 {
        self.device.id()
    }

    /// The brightness `turn_on()` will restore, if it's known.
    pub fn prev_brightness(&self) -> Option<f64> {
        self.prev_brightness
    }

    pub fn supported_features(&self) -> u32 {
        SUPPORT_BRIGHTNESS
    }

    /// Extra attributes the host shows with the light's state.
    pub fn device_state_attributes(&self) -> Map<String, Value> {
        let mut attr = Map::new();

        attr.insert(ATTR_INTEGRATION_ID.into(), self.device.id().into());
        attr
    }

    /// Returns the current brightness (0..=255) based on the level
    /// the controller last confirmed. A non-zero value is remembered
    /// so it can be restored later.
    pub fn brightness(&mut self) -> Result<i32> {
        let new_brightness = to_hass_level(self.device.last_level()?);

        debug!(
            "getting brightness: {} (prev {:?}) @ {}",
            new_brightness, self.prev_brightness, &self.device
        );

        if new_brightness != 0 {
            self.prev_brightness = Some(new_brightness as f64)
        }
        Ok(new_brightness)
    }

    /// Turns the light on. If `brightness` is given and the output is
    /// a dimmer, it's used. Otherwise the previous brightness is
    /// restored, or, if it's unknown or zero, the light goes to half
    /// brightness.
    pub fn turn_on(&mut self, brightness: Option<i32>) -> Result<()> {
        let (brightness, source) = select_brightness(
            brightness,
            self.device.is_dimmable(),
            self.prev_brightness,
        );

        debug!(
            "turning on: brightness {} (prev {:?}, source {}) @ {}",
            brightness,
            self.prev_brightness,
            source.as_str(),
            &self.device
        );

        // Remember the brightness before touching the hardware.

        self.prev_brightness = Some(brightness);
        debug!("in on: set prev {} @ {}", brightness, &self.device);

        self.device.set_level(to_lutron_level(brightness))?;

        info!(
            "turned on: brightness {} (source {}) @ {}",
            brightness,
            source.as_str(),
            &self.device
        );
        Ok(())
    }

    /// Turns the light off. The previous brightness is left alone so
    /// the next `turn_on()` can restore it.
    pub fn turn_off(&mut self) -> Result<()> {
        debug!(
            "turning off (prev {:?}) @ {}",
            self.prev_brightness, &self.device
        );

        self.device.set_level(0.0)?;

        info!(
            "turned off (prev {:?}) @ {}",
            self.prev_brightness, &self.device
        );
        Ok(())
    }

    /// A light is on when the controller's last confirmed level is
    /// above zero.
    pub fn is_on(&self) -> Result<bool> {
        let last = self.device.last_level()?;

        debug!(
            "checking on state: on {} last {} prev {:?} @ {}",
            last > 0.0,
            last,
            self.prev_brightness,
            &self.device
        );
        Ok(last > 0.0)
    }

    /// Called by the host when it refreshes the light. The first
    /// call seeds the previous brightness from the output's target
    /// level. Later calls do nothing.
    pub fn update(&mut self) -> Result<()> {
        if self.prev_brightness.is_none() {
            let prev = to_hass_level(self.device.level()?) as f64;

            self.prev_brightness = Some(prev);
            debug!("in update: setting prev {} @ {}", prev, &self.device);
        } else {
            debug!(
                "in update: prev {:?} @ {}",
                self.prev_brightness, &self.device
            );
        }
        Ok(())
    }
}

/// Creates a `Light` for every light the controller found. Each light
/// is updated before it's returned so the host starts with a known
/// previous brightness.
pub fn setup_platform<C: Controller>(
    controller: &C,
) -> Result<Vec<Light<C::Output>>> {
    controller
        .lights()?
        .into_iter()
        .map(|(area, device)| -> Result<Light<C::Output>> {
            let mut light = Light::new(area, device);

            light.update()?;
            debug!("added light '{}'", light.name());
            Ok(light)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use lutron_api::Error;
    use std::fmt;

    fn missing_peer<T>() -> Result<T> {
        Err(Error::MissingPeer("controller".into()))
    }

    // An output that keeps its state in the struct. When `fail` is
    // set, every access to the bus returns an error.

    struct TestOutput {
        id: u32,
        dimmable: bool,
        level: f64,
        last_level: f64,
        fail: bool,
    }

    impl TestOutput {
        fn new(level: f64) -> Self {
            TestOutput {
                id: 7,
                dimmable: true,
                level,
                last_level: level,
                fail: false,
            }
        }

        fn check(&self) -> Result<()> {
            if self.fail {
                missing_peer()
            } else {
                Ok(())
            }
        }
    }

    impl fmt::Display for TestOutput {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "test output {}", self.id)
        }
    }

    impl Output for TestOutput {
        fn last_level(&self) -> Result<f64> {
            self.check().map(|_| self.last_level)
        }

        fn level(&self) -> Result<f64> {
            self.check().map(|_| self.level)
        }

        fn set_level(&mut self, level: f64) -> Result<()> {
            self.check()?;
            self.level = level;
            self.last_level = level;
            Ok(())
        }

        fn is_dimmable(&self) -> bool {
            self.dimmable
        }

        fn id(&self) -> u32 {
            self.id
        }

        fn name(&self) -> &str {
            "Pendants"
        }
    }

    #[test]
    fn test_selection() {
        assert_eq!(
            select_brightness(Some(10), true, Some(200.0)),
            (10.0, Source::Attrs)
        );
        assert_eq!(
            select_brightness(Some(10), false, Some(200.0)),
            (200.0, Source::Previous)
        );
        assert_eq!(
            select_brightness(None, true, Some(200.0)),
            (200.0, Source::Previous)
        );
        assert_eq!(
            select_brightness(None, true, Some(0.0)),
            (127.5, Source::Default)
        );
        assert_eq!(
            select_brightness(Some(10), false, Some(0.0)),
            (127.5, Source::Default)
        );

        // An unknown previous brightness acts like zero.

        assert_eq!(
            select_brightness(None, true, None),
            (127.5, Source::Default)
        );
        assert_eq!(
            select_brightness(Some(300), false, None),
            (127.5, Source::Default)
        );
    }

    #[test]
    fn test_turn_on_with_brightness() {
        let mut light = Light::new("Kitchen", TestOutput::new(0.0));

        assert!(light.turn_on(Some(200)).is_ok());
        assert_eq!(light.device.level, to_lutron_level(200.0));
        assert!((light.device.level - 78.43).abs() < 0.01);
        assert_eq!(light.prev_brightness(), Some(200.0));

        // Out-of-range brightness values aren't clamped.

        assert!(light.turn_on(Some(510)).is_ok());
        assert_eq!(light.device.level, 200.0);
        assert_eq!(light.prev_brightness(), Some(510.0));
    }

    #[test]
    fn test_turn_on_not_dimmable() {
        let mut light = Light::new("Hall", TestOutput::new(0.0));

        light.device.dimmable = false;
        light.prev_brightness = Some(255.0);

        assert!(light.turn_on(Some(20)).is_ok());
        assert_eq!(light.device.level, 100.0);
        assert_eq!(light.prev_brightness(), Some(255.0));
    }

    #[test]
    fn test_turn_on_default() {
        let mut light = Light::new("Kitchen", TestOutput::new(0.0));

        light.prev_brightness = Some(0.0);

        assert!(light.turn_on(None).is_ok());
        assert_eq!(light.device.level, 50.0);
        assert_eq!(light.prev_brightness(), Some(127.5));

        // Turning on again keeps the fractional default.

        assert!(light.turn_on(None).is_ok());
        assert_eq!(light.device.level, 50.0);
        assert_eq!(light.prev_brightness(), Some(127.5));
    }

    #[test]
    fn test_turn_on_unknown_previous() {
        let mut light = Light::new("Kitchen", TestOutput::new(0.0));

        assert_eq!(light.prev_brightness(), None);
        assert!(light.turn_on(None).is_ok());
        assert_eq!(light.device.level, 50.0);
        assert_eq!(light.prev_brightness(), Some(127.5));
    }

    #[test]
    fn test_turn_off_keeps_previous() {
        let mut light = Light::new("Kitchen", TestOutput::new(0.0));

        assert!(light.turn_on(Some(200)).is_ok());
        assert!(light.turn_off().is_ok());
        assert_eq!(light.device.level, 0.0);
        assert_eq!(light.prev_brightness(), Some(200.0));
        assert_eq!(light.is_on(), Ok(false));

        // Turning it back on restores the old brightness.

        assert!(light.turn_on(None).is_ok());
        assert_eq!(light.device.level, to_lutron_level(200.0));
        assert_eq!(light.is_on(), Ok(true));
    }

    #[test]
    fn test_is_on() {
        let mut light = Light::new("Kitchen", TestOutput::new(0.0));

        assert_eq!(light.is_on(), Ok(false));

        light.device.last_level = 0.001;
        assert_eq!(light.is_on(), Ok(true));

        // Only the confirmed level matters.

        light.device.last_level = 0.0;
        light.device.level = 100.0;
        assert_eq!(light.is_on(), Ok(false));
    }

    #[test]
    fn test_brightness() {
        let mut light = Light::new("Kitchen", TestOutput::new(50.0));

        assert_eq!(light.brightness(), Ok(127));
        assert_eq!(light.prev_brightness(), Some(127.0));

        // A dark light reports zero but doesn't overwrite the
        // previous brightness.

        light.device.last_level = 0.0;
        assert_eq!(light.brightness(), Ok(0));
        assert_eq!(light.prev_brightness(), Some(127.0));

        light.device.last_level = 100.0;
        assert_eq!(light.brightness(), Ok(255));
        assert_eq!(light.prev_brightness(), Some(255.0));
    }

    #[test]
    fn test_update() {
        let mut light = Light::new("Kitchen", TestOutput::new(50.0));

        // The target level, not the confirmed level, seeds the
        // previous brightness.

        light.device.last_level = 0.0;

        assert!(light.update().is_ok());
        assert_eq!(light.prev_brightness(), Some(127.0));

        light.device.level = 100.0;

        assert!(light.update().is_ok());
        assert_eq!(light.prev_brightness(), Some(127.0));
    }

    #[test]
    fn test_update_dark_light() {
        let mut light = Light::new("Kitchen", TestOutput::new(0.0));

        assert!(light.update().is_ok());
        assert_eq!(light.prev_brightness(), Some(0.0));

        assert!(light.turn_on(None).is_ok());
        assert_eq!(light.device.level, 50.0);
    }

    #[test]
    fn test_errors_propagate() {
        let mut light = Light::new("Kitchen", TestOutput::new(40.0));

        light.device.fail = true;

        assert_eq!(light.brightness(), missing_peer());
        assert_eq!(light.is_on(), missing_peer());
        assert_eq!(light.turn_off(), missing_peer());
        assert_eq!(light.update(), missing_peer());
        assert_eq!(light.prev_brightness(), None);

        // The brightness is remembered even when the hardware
        // couldn't be updated.

        assert_eq!(light.turn_on(Some(90)), missing_peer());
        assert_eq!(light.prev_brightness(), Some(90.0));
        assert_eq!(light.device.level, 40.0);
    }

    #[test]
    fn test_metadata() {
        let light = Light::new("Kitchen", TestOutput::new(0.0));

        assert_eq!(light.name(), "Kitchen Pendants");
        assert_eq!(light.area(), "Kitchen");
        assert_eq!(light.integration_id(), 7);
        assert_eq!(light.supported_features(), SUPPORT_BRIGHTNESS);

        let attr = light.device_state_attributes();

        assert_eq!(attr.len(), 1);
        assert_eq!(attr.get("lutron_integration_id"), Some(&Value::from(7u32)));
    }

    struct TestController(Vec<(&'static str, f64)>);

    impl Controller for TestController {
        type Output = TestOutput;

        fn lights(&self) -> Result<Vec<(String, TestOutput)>> {
            Ok(self
                .0
                .iter()
                .enumerate()
                .map(|(idx, (area, level))| {
                    let mut out = TestOutput::new(*level);

                    out.id = idx as u32 + 1;
                    (area.to_string(), out)
                })
                .collect())
        }
    }

    #[test]
    fn test_setup_platform() {
        let lights = setup_platform(&TestController(vec![
            ("Kitchen", 100.0),
            ("Den", 0.0),
        ]))
        .expect("setup should succeed");

        assert_eq!(lights.len(), 2);

        assert_eq!(lights[0].area(), "Kitchen");
        assert_eq!(lights[0].integration_id(), 1);
        assert_eq!(lights[0].prev_brightness(), Some(255.0));

        assert_eq!(lights[1].area(), "Den");
        assert_eq!(lights[1].integration_id(), 2);
        assert_eq!(lights[1].prev_brightness(), Some(0.0));

        assert!(setup_platform(&TestController(vec![]))
            .expect("setup should succeed")
            .is_empty());
    }
}
