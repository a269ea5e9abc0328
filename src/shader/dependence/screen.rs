use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::utils::hash::hash64;

use super::super::config::{Operation, ShaderConfiguration};
use super::super::object::{Origin, ShaderObject, ShaderType};
use super::{Dependencies, DependenceKey, ShaderDependence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Width,
    Height,
}

/// `uniform float width;` or `uniform float height;`, fed with the
/// dimensions of the surface reported by the configuration.
#[derive(Debug)]
pub struct ScreenDependence(Dimension);

impl ScreenDependence {
    pub fn width() -> Self {
        ScreenDependence(Dimension::Width)
    }

    pub fn height() -> Self {
        ScreenDependence(Dimension::Height)
    }

    pub fn name(&self) -> &'static str {
        match self.0 {
            Dimension::Width => "width",
            Dimension::Height => "height",
        }
    }
}

impl ShaderDependence for ScreenDependence {
    fn key(&self) -> DependenceKey {
        DependenceKey::new("uniform", self.name())
    }

    fn header(&self) -> Option<String> {
        Some(format!("uniform float {};", self.name()))
    }

    fn operation(&self) -> Option<Operation> {
        let dimension = self.0;
        Some(Rc::new(move |cfg: &mut dyn ShaderConfiguration| {
            let dimensions = cfg.dimensions();
            match dimension {
                Dimension::Width => cfg.set_float("width", dimensions.x as f32),
                Dimension::Height => cfg.set_float("height", dimensions.y as f32),
            }
        }))
    }
}

/// The animation clock behind `uniform float time;`.
#[derive(Debug, Clone)]
pub enum Clock {
    /// Seconds elapsed since the clock has been created.
    Realtime(Instant),
    /// Seconds set by the host, e.g. from a fixed-step timeline.
    Manual(Rc<Cell<f32>>),
}

impl Clock {
    pub fn realtime() -> Self {
        Clock::Realtime(Instant::now())
    }

    pub fn manual(seconds: f32) -> Self {
        Clock::Manual(Rc::new(Cell::new(seconds)))
    }

    pub fn seconds(&self) -> f32 {
        match *self {
            Clock::Realtime(start) => {
                let elapsed = start.elapsed();
                elapsed.as_secs() as f32 + elapsed.subsec_nanos() as f32 * 1e-9
            }
            Clock::Manual(ref v) => v.get(),
        }
    }

    /// Tells clocks apart, clones of a clock share it.
    fn identity(&self) -> u64 {
        match *self {
            Clock::Realtime(start) => hash64(&(0u8, start)),
            Clock::Manual(ref v) => hash64(&(1u8, Rc::as_ptr(v) as usize)),
        }
    }

    /// Moves a manual clock to `seconds`, does nothing on a realtime clock.
    pub fn set(&self, seconds: f32) {
        if let Clock::Manual(ref v) = *self {
            v.set(seconds);
        }
    }
}

#[derive(Debug)]
pub struct TimeDependence {
    clock: Clock,
}

impl TimeDependence {
    pub fn new(clock: Clock) -> Self {
        TimeDependence { clock }
    }
}

impl ShaderDependence for TimeDependence {
    fn key(&self) -> DependenceKey {
        DependenceKey::new("uniform", "time")
    }

    fn fingerprint(&self) -> u64 {
        self.clock.identity()
    }

    fn header(&self) -> Option<String> {
        Some("uniform float time;".to_owned())
    }

    fn operation(&self) -> Option<Operation> {
        let clock = self.clock.clone();
        Some(Rc::new(move |cfg: &mut dyn ShaderConfiguration| {
            cfg.set_float("time", clock.seconds())
        }))
    }
}

impl ShaderObject {
    /// The width of the surface in pixels.
    pub fn width() -> Self {
        let dependencies = Dependencies::single(Rc::new(ScreenDependence::width()));
        ShaderObject::new(ShaderType::Float, "width", Origin::Global, dependencies)
    }

    /// The height of the surface in pixels.
    pub fn height() -> Self {
        let dependencies = Dependencies::single(Rc::new(ScreenDependence::height()));
        ShaderObject::new(ShaderType::Float, "height", Origin::Global, dependencies)
    }

    /// Seconds measured by `clock`.
    pub fn time(clock: &Clock) -> Self {
        let dependencies = Dependencies::single(Rc::new(TimeDependence::new(clock.clone())));
        ShaderObject::new(ShaderType::Float, "time", Origin::Global, dependencies)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clocks() {
        let clock = Clock::manual(1.5);
        assert_eq!(clock.seconds(), 1.5);
        clock.set(2.0);
        assert_eq!(clock.seconds(), 2.0);

        let clock = Clock::realtime();
        assert!(clock.seconds() >= 0.0);
    }

    #[test]
    fn screen() {
        let w = ShaderObject::width();
        let dep = w.dependencies().iter().next().unwrap();
        assert_eq!(dep.header().unwrap(), "uniform float width;");
        assert_eq!(dep.key(), DependenceKey::new("uniform", "width"));
    }
}
