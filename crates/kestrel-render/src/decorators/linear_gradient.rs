//! `linear-gradient(angle?|to side?, color-stop, ...)`
//!
//! The gradient line and stop positions are resolved per element, then
//! handed to the backend as a `linear-gradient` effect drawn over a quad
//! whose texture coordinates are in pixels of the painting area.

use crate::decorator::{DecoratedElement, Decorator, DecoratorClasses, DecoratorInstancer};
use crate::interface::{generate_quad, EffectParameters, EffectValue, ResolvedColorStop};
use crate::pool::{BasicEffectElementData, DecoratorDataHandle, RenderResources};
use crate::DecoratorError;
use kestrel_css::values::{parse_angle, parse_color, parse_length, split_arguments, split_commas};
use kestrel_css::{Color, Length};
use kestrel_dom::{BoxArea, Vector2f};
use std::f32::consts::{PI, TAU};
use std::rc::Rc;

/// Declared position of a color stop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopPosition {
    Auto,
    /// Fraction of the gradient line
    Number(f32),
    Length(Length),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub color: Color,
    pub position: StopPosition,
}

/// Direction of the gradient line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientAngle {
    /// Radians, clockwise from "to top"
    Fixed(f32),
    /// `to <vertical> <horizontal>`; the angle depends on the box aspect
    Corner { right: bool, bottom: bool },
}

impl GradientAngle {
    fn resolve(self, dimensions: Vector2f) -> f32 {
        match self {
            GradientAngle::Fixed(angle) => angle,
            GradientAngle::Corner { right, bottom } => {
                let a = dimensions.y.atan2(dimensions.x);
                match (right, bottom) {
                    (true, false) => a,
                    (true, true) => PI - a,
                    (false, true) => PI + a,
                    (false, false) => TAU - a,
                }
            }
        }
    }
}

/// End points and length of the gradient line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientPoints {
    pub p0: Vector2f,
    pub p1: Vector2f,
    pub length: f32,
}

/// Gradient line for `angle` across a box of `dimensions`
///
/// The line passes through the center; its ends are the projections of
/// the corners the angle points away from and towards.
pub fn gradient_points(angle: f32, dimensions: Vector2f) -> GradientPoints {
    let corners = [
        Vector2f::new(dimensions.x, 0.0),
        dimensions,
        Vector2f::new(0.0, dimensions.y),
        Vector2f::ZERO,
    ];
    let quadrant = (angle.rem_euclid(TAU) * (4.0 / TAU)) as usize % 4;
    let opposite = (quadrant + 2) % 4;

    let center = dimensions * 0.5;
    let line = Vector2f::new(angle.sin(), -angle.cos());
    let project = |point: Vector2f| center - line * (center - point).dot(line);

    GradientPoints {
        p0: project(corners[opposite]),
        p1: project(corners[quadrant]),
        length: (dimensions.x * line.x).abs() + (dimensions.y * line.y).abs(),
    }
}

/// Resolve every stop to a strictly increasing fraction of `length`
///
/// Consecutive stops are kept at least one pixel apart; runs of auto stops
/// are spread evenly between their neighbours.
pub fn resolve_stops(stops: &[ColorStop], length: f32, viewport: Vector2f) -> Vec<ResolvedColorStop> {
    if stops.is_empty() {
        return Vec::new();
    }
    let pixel = if length > 0.0 { 1.0 / length } else { 0.0 };

    let mut positions: Vec<Option<f32>> = stops
        .iter()
        .map(|stop| match stop.position {
            StopPosition::Auto => None,
            StopPosition::Number(n) => Some(n),
            StopPosition::Length(l) => {
                Some(if length > 0.0 { l.to_px(viewport.x, viewport.y) / length } else { 0.0 })
            }
        })
        .collect();

    let last = positions.len() - 1;
    positions[0] = positions[0].or(Some(0.0));
    positions[last] = positions[last].or(Some(1.0));

    let mut resolved: Vec<f32> = positions.iter().map(|p| p.unwrap_or(0.0)).collect();
    let mut prev = resolved[0];
    let mut auto_begin: Option<usize> = None;

    for i in 1..resolved.len() {
        match (positions[i], auto_begin) {
            (None, None) => auto_begin = Some(i),
            (None, Some(_)) => {}
            (Some(_), None) => {
                resolved[i] = resolved[i].max(prev + pixel);
                prev = resolved[i];
            }
            (Some(_), Some(begin)) => {
                resolved[i] = resolved[i].max(prev + pixel);
                let count = i - begin;
                let t0 = resolved[begin - 1];
                let t1 = resolved[i];
                for j in 0..count {
                    let fraction = (j + 1) as f32 / (count + 1) as f32;
                    let k = begin + j;
                    resolved[k] = (t0 + (t1 - t0) * fraction).max(prev + pixel);
                    prev = resolved[k];
                }
                resolved[i] = resolved[i].max(prev + pixel);
                prev = resolved[i];
                auto_begin = None;
            }
        }
    }

    stops
        .iter()
        .zip(resolved)
        .map(|(stop, position)| ResolvedColorStop { color: stop.color, position })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradientDecorator {
    angle: GradientAngle,
    stops: Vec<ColorStop>,
}

impl LinearGradientDecorator {
    /// `None` without color stops
    pub fn new(angle: GradientAngle, stops: Vec<ColorStop>) -> Option<Self> {
        (!stops.is_empty()).then_some(Self { angle, stops })
    }
}

impl Decorator for LinearGradientDecorator {
    fn generate_element_data(
        &self,
        element: &dyn DecoratedElement,
        painting_area: BoxArea,
        resources: &RenderResources,
    ) -> Option<DecoratorDataHandle> {
        let layout = element.layout_box();
        let origin = layout.position(painting_area);
        let dimensions = layout.size(painting_area);
        let viewport = resources.viewport();
        let viewport = Vector2f::new(viewport.x as f32, viewport.y as f32);

        let angle = self.angle.resolve(dimensions);
        let points = gradient_points(angle, dimensions);
        let stops = resolve_stops(&self.stops, points.length, viewport);

        let parameters = EffectParameters::new()
            .with("angle", EffectValue::Float(angle))
            .with("p0", EffectValue::Vector(points.p0))
            .with("p1", EffectValue::Vector(points.p1))
            .with("length", EffectValue::Float(points.length))
            .with("color_stop_list", EffectValue::ColorStops(stops));

        let (mut vertices, indices) = generate_quad(origin, dimensions, Color::WHITE);
        for vertex in &mut vertices {
            vertex.tex_coord = vertex.position - origin;
        }

        let mut render_interface = resources.render_interface();
        let effect = render_interface.compile_effect("linear-gradient", &parameters);
        let geometry = render_interface.compile_geometry(&vertices, &indices, None);
        drop(render_interface);

        resources.store(BasicEffectElementData { effect, geometry })
    }

    fn render_element(&self, element: &dyn DecoratedElement, data: DecoratorDataHandle, resources: &RenderResources) {
        let Some(BasicEffectElementData { effect: Some(effect), geometry }) = resources.data(data) else {
            return;
        };
        let offset = element.layout_box().absolute_offset(BoxArea::Border);
        resources.render_interface().render_effect(effect, geometry, offset);
    }
}

#[derive(Debug, Default)]
pub struct LinearGradientInstancer;

fn parse_direction(text: &str) -> Option<GradientAngle> {
    if let Some(angle) = parse_angle(text) {
        return Some(GradientAngle::Fixed(angle));
    }
    let mut words = text.split_whitespace();
    if !words.next()?.eq_ignore_ascii_case("to") {
        return None;
    }
    let (mut horizontal, mut vertical) = (None, None);
    for word in words {
        match word.to_ascii_lowercase().as_str() {
            "left" if horizontal.is_none() => horizontal = Some(false),
            "right" if horizontal.is_none() => horizontal = Some(true),
            "top" if vertical.is_none() => vertical = Some(false),
            "bottom" if vertical.is_none() => vertical = Some(true),
            _ => return None,
        }
    }
    Some(match (horizontal, vertical) {
        (None, Some(false)) => GradientAngle::Fixed(0.0),
        (Some(true), None) => GradientAngle::Fixed(0.5 * PI),
        (None, Some(true)) => GradientAngle::Fixed(PI),
        (Some(false), None) => GradientAngle::Fixed(1.5 * PI),
        (Some(right), Some(bottom)) => GradientAngle::Corner { right, bottom },
        (None, None) => return None,
    })
}

fn parse_stop(text: &str) -> Option<ColorStop> {
    let parts = split_arguments(text);
    let (color, position) = match parts.as_slice() {
        [color] => (color, None),
        [color, position] => (color, Some(position)),
        _ => return None,
    };
    let position = match position {
        None => StopPosition::Auto,
        Some(p) => match p.strip_suffix('%') {
            Some(percent) => StopPosition::Number(percent.trim().parse::<f32>().ok()? / 100.0),
            None => StopPosition::Length(parse_length(p)?),
        },
    };
    Some(ColorStop { color: parse_color(color)?, position })
}

impl DecoratorInstancer for LinearGradientInstancer {
    fn classes(&self) -> DecoratorClasses {
        DecoratorClasses::BACKGROUND | DecoratorClasses::MASK_IMAGE
    }

    fn instance_decorator(&self, name: &str, arguments: &str) -> Result<Rc<dyn Decorator>, DecoratorError> {
        let invalid = || DecoratorError::InvalidArguments { name: name.to_string(), arguments: arguments.to_string() };

        let mut items = split_commas(arguments).into_iter().peekable();
        let angle = match items.peek().and_then(|first| parse_direction(first)) {
            Some(angle) => {
                items.next();
                angle
            }
            None => GradientAngle::Fixed(PI),
        };
        let stops = items.map(|item| parse_stop(&item)).collect::<Option<Vec<_>>>().ok_or_else(invalid)?;

        let decorator = LinearGradientDecorator::new(angle, stops).ok_or_else(invalid)?;
        Ok(Rc::new(decorator))
    }
}
