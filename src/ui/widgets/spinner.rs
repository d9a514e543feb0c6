// SPDX-License-Identifier: MPL-2.0
//! Rotating arc shown while a submission is in flight.

use crate::ui::design_tokens::sizing;
use iced::widget::canvas::{self, Canvas, Frame, Geometry, Path, Stroke};
use iced::{mouse, Color, Element, Length, Point, Rectangle, Renderer, Theme};
use std::f32::consts::{PI, TAU};

const STROKE_WIDTH: f32 = 3.0;
const ARC_SEGMENTS: u16 = 30;
/// Radians advanced per animation tick.
pub const STEP: f32 = PI / 12.0;

pub struct Spinner {
    rotation: f32,
    color: Color,
    size: f32,
}

impl Spinner {
    #[must_use]
    pub fn new(color: Color, rotation: f32) -> Self {
        Self {
            rotation,
            color,
            size: sizing::ICON_XL,
        }
    }

    pub fn into_element<Message: 'static>(self) -> Element<'static, Message> {
        let size = self.size;
        Canvas::new(self)
            .width(Length::Fixed(size))
            .height(Length::Fixed(size))
            .into()
    }
}

/// Advances a rotation angle by one tick, wrapping at a full turn.
#[must_use]
pub fn advance(rotation: f32) -> f32 {
    (rotation + STEP) % TAU
}

impl<Message> canvas::Program<Message> for Spinner {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let center = frame.center();
        let radius = frame.width().min(frame.height()) / 2.0 - 4.0;

        frame.stroke(
            &Path::circle(center, radius),
            Stroke::default()
                .with_width(STROKE_WIDTH)
                .with_color(Color { a: 0.25, ..self.color }),
        );

        // Half-circle arc starting at twelve o'clock.
        let start = self.rotation - PI / 2.0;
        let arc = Path::new(|builder| {
            builder.move_to(Point::new(
                center.x + radius * start.cos(),
                center.y + radius * start.sin(),
            ));
            for i in 1..=ARC_SEGMENTS {
                let angle = start + PI * f32::from(i) / f32::from(ARC_SEGMENTS);
                builder.line_to(Point::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                ));
            }
        });
        frame.stroke(
            &arc,
            Stroke::default()
                .with_width(STROKE_WIDTH)
                .with_color(self.color)
                .with_line_cap(canvas::LineCap::Round),
        );

        vec![frame.into_geometry()]
    }
}
