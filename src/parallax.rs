//! Card tilt following the pointer.

/// Pointer offset is divided by this to get degrees of rotation.
const DAMPING: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Rotation in degrees around each axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tilt {
    pub rotate_x: f64,
    pub rotate_y: f64,
}

/// Horizontal pointer offset turns the card around its Y axis, vertical
/// offset around its X axis. A centered pointer leaves it flat.
pub fn tilt(pointer: Point, viewport: Viewport) -> Tilt {
    Tilt {
        rotate_x: (pointer.y - viewport.height / 2.0) / DAMPING,
        rotate_y: (pointer.x - viewport.width / 2.0) / DAMPING,
    }
}

impl Tilt {
    pub fn css_transform(&self) -> String {
        format!(
            "perspective(1000px) rotateX({}deg) rotateY({}deg) translateZ(0)",
            self.rotate_x, self.rotate_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Viewport = Viewport {
        width: 1000.0,
        height: 800.0,
    };

    #[test]
    fn centered_pointer_is_flat() {
        let t = tilt(Point { x: 500.0, y: 400.0 }, SCREEN);
        assert_eq!(t, Tilt::default());
    }

    #[test]
    fn corners() {
        let t = tilt(Point { x: 0.0, y: 0.0 }, SCREEN);
        assert_eq!(t.rotate_y, -10.0);
        assert_eq!(t.rotate_x, -8.0);

        let t = tilt(Point { x: 1000.0, y: 800.0 }, SCREEN);
        assert_eq!(t.rotate_y, 10.0);
        assert_eq!(t.rotate_x, 8.0);
    }

    #[test]
    fn transform_string() {
        let t = tilt(Point { x: 750.0, y: 300.0 }, SCREEN);
        assert_eq!(
            t.css_transform(),
            "perspective(1000px) rotateX(-2deg) rotateY(5deg) translateZ(0)"
        );
    }
}
