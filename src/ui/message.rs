//! Message box (info, warning, error, question).

use crate::{
    backend::{MouseButton, Window, WindowEvent, create_window, keys},
    error::Error,
    render::{Canvas, Font, Rgba, rgb},
    ui::{
        ButtonPreset, Colors, DialogResult, Icon,
        widgets::{
            Widget,
            button::{BASE_BUTTON_HEIGHT, Button},
            px,
        },
    },
};

const BASE_ICON_SIZE: u32 = 48;
const BASE_PADDING: u32 = 20;
const BASE_BUTTON_SPACING: u32 = 10;
const BASE_MIN_WIDTH: u32 = 300;
const BASE_MAX_TEXT_WIDTH: f32 = 350.0;

/// Message dialog builder.
pub struct MessageBuilder {
    title: String,
    text: String,
    icon: Option<Icon>,
    buttons: ButtonPreset,
    colors: Option<&'static Colors>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            icon: None,
            buttons: ButtonPreset::Ok,
            colors: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn buttons(mut self, buttons: ButtonPreset) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn colors(mut self, colors: &'static Colors) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn show(self) -> Result<DialogResult, Error> {
        let colors = self.colors.unwrap_or_else(|| crate::ui::detect_theme());
        let labels = self.buttons.labels();

        // First pass: logical size at scale 1.0.
        let temp_font = Font::load(1.0)?;
        let temp_buttons: Vec<Button> = labels
            .iter()
            .map(|l| Button::new(l, &temp_font, 1.0))
            .collect();
        let logical_buttons_width: u32 = temp_buttons.iter().map(|b| b.width()).sum::<u32>()
            + (temp_buttons.len().saturating_sub(1) as u32 * BASE_BUTTON_SPACING);
        let temp_text = temp_font
            .render(&self.text)
            .with_max_width(BASE_MAX_TEXT_WIDTH)
            .finish();

        let logical_icon_width = if self.icon.is_some() {
            BASE_ICON_SIZE + BASE_PADDING
        } else {
            0
        };
        let logical_inner_width = (logical_icon_width + temp_text.width()).max(logical_buttons_width);
        let logical_width = (logical_inner_width + BASE_PADDING * 2).max(BASE_MIN_WIDTH);
        let logical_text_height = temp_text.height().max(BASE_ICON_SIZE);
        let logical_height = BASE_PADDING * 3 + logical_text_height + BASE_BUTTON_HEIGHT;
        drop(temp_buttons);
        drop(temp_font);

        tracing::debug!(logical_width, logical_height, "message box layout");
        let mut window = create_window(
            logical_width.min(u16::MAX as u32) as u16,
            logical_height.min(u16::MAX as u32) as u16,
        )?;
        window.set_title(&self.title)?;

        // Second pass: everything at the compositor's scale.
        let scale = window.scale_factor();
        let font = Font::load(scale)?;
        let padding = px(BASE_PADDING, scale);
        let button_spacing = px(BASE_BUTTON_SPACING, scale);
        let button_height = px(BASE_BUTTON_HEIGHT, scale);
        let physical_width = px(logical_width, scale);
        let physical_height = px(logical_height, scale);

        let mut buttons: Vec<Button> = labels.iter().map(|l| Button::new(l, &font, scale)).collect();
        let mut button_x = physical_width as i32 - padding as i32;
        for button in buttons.iter_mut().rev() {
            button_x -= button.width() as i32;
            button.set_position(button_x, (physical_height - padding - button_height) as i32);
            button_x -= button_spacing as i32;
        }

        let text_canvas = font
            .render(&self.text)
            .with_color(colors.text)
            .with_max_width(BASE_MAX_TEXT_WIDTH * scale)
            .finish();
        let symbol_canvas = self
            .icon
            .map(|icon| font.render(icon_symbol(icon)).with_color(rgb(255, 255, 255)).finish());

        let page = Page {
            colors,
            icon: self.icon,
            text: &text_canvas,
            symbol: symbol_canvas.as_ref(),
            scale,
        };

        let mut canvas = Canvas::new(physical_width, physical_height);
        page.draw(&mut canvas, &buttons, &font);
        window.set_contents(&canvas)?;
        window.show()?;

        let mut dragging = false;
        loop {
            let event = window.wait_for_event()?;
            let mut needs_redraw = false;

            match &event {
                WindowEvent::CloseRequested => return Ok(DialogResult::Closed),
                WindowEvent::RedrawRequested => needs_redraw = true,
                WindowEvent::KeyPress(key)
                    if key.keysym == keys::RETURN || key.keysym == keys::KP_ENTER =>
                {
                    return Ok(DialogResult::Button(0));
                }
                WindowEvent::ButtonPress(MouseButton::Left) => {
                    dragging = !buttons.iter().any(|b| b.is_hovered());
                }
                WindowEvent::ButtonRelease(MouseButton::Left) => dragging = false,
                WindowEvent::CursorMove(_) if dragging => {
                    dragging = false;
                    if let Err(e) = window.start_drag() {
                        tracing::debug!("window drag failed: {e}");
                    }
                }
                _ => {}
            }

            if let Some(index) = feed_buttons(&mut buttons, &event, &mut needs_redraw) {
                return Ok(DialogResult::Button(index));
            }

            while let Some(event) = window.poll_for_event()? {
                if let WindowEvent::CloseRequested = event {
                    return Ok(DialogResult::Closed);
                }
                if let Some(index) = feed_buttons(&mut buttons, &event, &mut needs_redraw) {
                    return Ok(DialogResult::Button(index));
                }
            }

            if needs_redraw {
                page.draw(&mut canvas, &buttons, &font);
                window.set_contents(&canvas)?;
            }
        }
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the button clicked by `event`, if any.
fn feed_buttons(buttons: &mut [Button], event: &WindowEvent, needs_redraw: &mut bool) -> Option<usize> {
    for (i, button) in buttons.iter_mut().enumerate() {
        *needs_redraw |= button.process_event(event);
        if button.was_clicked() {
            return Some(i);
        }
    }
    None
}

/// Pre-rendered static content of the message box.
struct Page<'a> {
    colors: &'a Colors,
    icon: Option<Icon>,
    text: &'a Canvas,
    symbol: Option<&'a Canvas>,
    scale: f32,
}

impl Page<'_> {
    fn draw(&self, canvas: &mut Canvas, buttons: &[Button], font: &Font) {
        let icon_size = px(BASE_ICON_SIZE, self.scale);
        let padding = px(BASE_PADDING, self.scale);

        canvas.fill_dialog_bg(
            canvas.width() as f32,
            canvas.height() as f32,
            self.colors.window_bg,
            self.colors.window_border,
            self.colors.window_shadow,
            8.0 * self.scale,
        );

        let mut x = padding as i32;
        let y = padding as i32;
        if let Some(icon) = self.icon {
            draw_icon(canvas, x, y, icon, self.symbol, self.scale);
            x += (icon_size + padding) as i32;
        }

        // Center text vertically with the icon.
        let text_y = y + (icon_size as i32 - self.text.height() as i32) / 2;
        canvas.draw_canvas(self.text, x, text_y.max(y));

        for button in buttons {
            button.draw_to(canvas, self.colors, font);
        }
    }
}

fn icon_symbol(icon: Icon) -> &'static str {
    match icon {
        Icon::Info => "i",
        Icon::Warning => "!",
        Icon::Error => "X",
        Icon::Question => "?",
    }
}

fn icon_color(icon: Icon) -> Rgba {
    match icon {
        Icon::Info => rgb(66, 133, 244),
        Icon::Warning => rgb(251, 188, 4),
        Icon::Error => rgb(234, 67, 53),
        Icon::Question => rgb(52, 168, 83),
    }
}

fn draw_icon(canvas: &mut Canvas, x: i32, y: i32, icon: Icon, symbol: Option<&Canvas>, scale: f32) {
    let size = px(BASE_ICON_SIZE, scale) as f32;
    let inset = 4.0 * scale;
    let color = icon_color(icon);
    let (x0, y0) = (x as f32, y as f32);

    if icon == Icon::Warning {
        canvas.fill_polygon(
            &[
                (x0 + size / 2.0, y0 + inset),
                (x0 + size - inset, y0 + size - inset),
                (x0 + inset, y0 + size - inset),
            ],
            color,
        );
    } else {
        let r = size / 2.0 - 2.0 * scale;
        canvas.fill_circle(x0 + size / 2.0, y0 + size / 2.0, r, color);
    }

    if let Some(symbol) = symbol {
        let sx = x + (size as i32 - symbol.width() as i32) / 2;
        // The triangle's visual centre sits lower than the box centre.
        let drop = if icon == Icon::Warning { inset as i32 } else { 0 };
        let sy = y + (size as i32 - symbol.height() as i32) / 2 + drop;
        canvas.draw_canvas(symbol, sx, sy);
    }
}
