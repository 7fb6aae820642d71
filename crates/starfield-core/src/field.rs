use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

pub const STAR_COUNT: usize = 300;
pub const REPULSION_RADIUS: f64 = 150.0;
pub const PUSH_SCALE: f64 = 5.0;
pub const EASE_DIVISOR: f64 = 20.0;
pub const MAX_STAR_SIZE: f64 = 2.0;
pub const MIN_DENSITY: f64 = 1.0;
pub const DENSITY_SPAN: f64 = 10.0;

/// Where the pointer sits before the first move event: far enough off-surface
/// that no star is within the repulsion radius.
pub const POINTER_PARKED: Pointer = Pointer {
    x: -1000.0,
    y: -1000.0,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    x: f64,
    y: f64,
    base_x: f64,
    base_y: f64,
    size: f64,
    density: f64,
}

impl Star {
    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn base(&self) -> (f64, f64) {
        (self.base_x, self.base_y)
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Advances one frame against a stationary pointer.
    ///
    /// Inside the repulsion radius the star is pushed straight away from the
    /// pointer, harder the closer it is. Outside it, each axis closes 1/20th
    /// of the gap to the rest position.
    pub fn update(&mut self, pointer: Pointer) {
        let dx = pointer.x - self.x;
        let dy = pointer.y - self.y;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance < REPULSION_RADIUS {
            // Exact overlap has no direction; leave the star where it is.
            if distance > 0.0 {
                let force = (REPULSION_RADIUS - distance) / REPULSION_RADIUS;
                let push = force * self.density * PUSH_SCALE;
                self.x -= dx / distance * push;
                self.y -= dy / distance * push;
            }
        } else {
            if self.x != self.base_x {
                self.x -= (self.x - self.base_x) / EASE_DIVISOR;
            }
            if self.y != self.base_y {
                self.y -= (self.y - self.base_y) / EASE_DIVISOR;
            }
        }
    }
}

/// The whole particle field: the star batch, the surface it was laid out on,
/// and the last known pointer position.
#[wasm_bindgen]
pub struct StarField {
    stars: Vec<Star>,
    width: f64,
    height: f64,
    pointer: Pointer,
    rng: u32,
}

#[wasm_bindgen]
impl StarField {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32) -> StarField {
        StarField {
            stars: Vec::with_capacity(STAR_COUNT),
            width: 0.0,
            height: 0.0,
            pointer: POINTER_PARKED,
            rng: if seed == 0 { 1 } else { seed },
        }
    }

    /// Throws away every star and lays out a fresh batch of `STAR_COUNT`
    /// over a `width` x `height` surface.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = clamp_extent(width);
        self.height = clamp_extent(height);

        let mut stars = Vec::with_capacity(STAR_COUNT);
        for _ in 0..STAR_COUNT {
            let x = self.rand01() * self.width;
            let y = self.rand01() * self.height;
            let size = self.rand01() * MAX_STAR_SIZE;
            let density = self.rand01() * DENSITY_SPAN + MIN_DENSITY;
            stars.push(Star {
                x,
                y,
                base_x: x,
                base_y: y,
                size,
                density,
            });
        }
        self.stars = stars;
    }

    pub fn set_pointer(&mut self, x: f64, y: f64) {
        self.pointer = Pointer { x, y };
    }

    pub fn step(&mut self) {
        let pointer = self.pointer;
        for star in &mut self.stars {
            star.update(pointer);
        }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Current positions as `[x0, y0, x1, y1, ...]`.
    pub fn positions(&self) -> Float64Array {
        Float64Array::from(self.position_buffer().as_slice())
    }

    pub fn sizes(&self) -> Float64Array {
        let sizes: Vec<f64> = self.stars.iter().map(|s| s.size).collect();
        Float64Array::from(sizes.as_slice())
    }
}

impl StarField {
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    fn position_buffer(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.stars.len() * 2);
        for star in &self.stars {
            out.push(star.x);
            out.push(star.y);
        }
        out
    }

    fn rand_u32(&mut self) -> u32 {
        // xorshift32
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        x
    }

    fn rand01(&mut self) -> f64 {
        (self.rand_u32() as f64) / 4_294_967_296.0
    }
}

fn clamp_extent(v: f64) -> f64 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}
