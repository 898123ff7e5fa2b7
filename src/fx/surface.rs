#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in logical surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// The drawing capabilities a particle field needs from its host.
///
/// Coordinates are logical pixels; `set_backing_size` tells the surface how
/// many physical pixels back them.
pub trait DrawingSurface {
    fn set_backing_size(&mut self, width: u32, height: u32, scale: f32);

    /// Wipes the whole surface to fully transparent.
    fn clear(&mut self);

    fn fill_vertical_gradient(&mut self, area: PixelRect, top: Rgba, bottom: Rgba);

    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Rgba);

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba);

    fn stroke_ellipse(
        &mut self,
        center: Point,
        radius_x: f32,
        radius_y: f32,
        width: f32,
        color: Rgba,
    );
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BackingSize {
        width: u32,
        height: u32,
        scale: f32,
    },
    Clear,
    Gradient {
        area: PixelRect,
        top: Rgba,
        bottom: Rgba,
    },
    Line {
        from: Point,
        to: Point,
        width: f32,
        color: Rgba,
    },
    Circle {
        center: Point,
        radius: f32,
        color: Rgba,
    },
    Ellipse {
        center: Point,
        radius_x: f32,
        radius_y: f32,
        width: f32,
        color: Rgba,
    },
}

/// Surface that remembers every call, for inspection in tests and tooling.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|cmd| pred(cmd)).count()
    }

    pub fn clears(&self) -> usize {
        self.count(|cmd| matches!(cmd, DrawCommand::Clear))
    }
}

impl DrawingSurface for RecordingSurface {
    fn set_backing_size(&mut self, width: u32, height: u32, scale: f32) {
        self.commands.push(DrawCommand::BackingSize {
            width,
            height,
            scale,
        });
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_vertical_gradient(&mut self, area: PixelRect, top: Rgba, bottom: Rgba) {
        self.commands.push(DrawCommand::Gradient { area, top, bottom });
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn stroke_ellipse(
        &mut self,
        center: Point,
        radius_x: f32,
        radius_y: f32,
        width: f32,
        color: Rgba,
    ) {
        self.commands.push(DrawCommand::Ellipse {
            center,
            radius_x,
            radius_y,
            width,
            color,
        });
    }
}
