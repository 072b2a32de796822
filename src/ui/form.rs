//! Composite input dialog: requested widgets stacked vertically above OK/Cancel.

use std::time::Instant;

use image::RgbaImage;

use crate::{
    backend::{CursorShape, Modifiers, MouseButton, Window, WindowEvent, create_window, keys},
    cli::{ItemSpec, MAX_DIMENSION},
    error::Error,
    render::{Canvas, Font},
    ui::{
        Colors, FieldValue,
        media::{self, Frame},
        widgets::{
            Bounded, Widget,
            button::{BASE_BUTTON_HEIGHT, Button},
            calendar::Calendar,
            checkbox::Checkbox,
            clock::Clock,
            datetime::DateTimeEdit,
            dial::Dial,
            image_view::ImageView,
            list_view::ListView,
            movie::Movie,
            px,
            radio::RadioGroup,
            slider::Slider,
            text_input::TextInput,
        },
    },
};

const BASE_PADDING: u32 = 20;
const BASE_ROW_SPACING: u32 = 14;
const BASE_CAPTION_GAP: u32 = 6;
const BASE_BUTTON_SPACING: u32 = 10;
const BASE_ENTRY_WIDTH: u32 = 300;
const BASE_MIN_WIDTH: u32 = 360;

/// How the form dialog ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormResult {
    /// One value slot per requested item, in request order.
    Accepted(Vec<Option<FieldValue>>),
    Cancelled,
    Closed,
}

impl FormResult {
    pub fn exit_code(&self) -> i32 {
        match self {
            FormResult::Accepted(_) => 0,
            FormResult::Cancelled | FormResult::Closed => 1,
        }
    }
}

/// Form dialog builder.
pub struct FormBuilder {
    title: String,
    items: Vec<ItemSpec>,
    window_size: Option<(u32, u32)>,
    colors: Option<&'static Colors>,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self {
            title: crate::cli::DEFAULT_FORM_TITLE.to_string(),
            items: Vec::new(),
            window_size: None,
            colors: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn item(mut self, item: ItemSpec) -> Self {
        self.items.push(item);
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = ItemSpec>) -> Self {
        self.items.extend(items);
        self
    }

    /// Logical window size. A zero dimension keeps the computed one.
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = Some((width, height));
        self
    }

    pub fn colors(mut self, colors: &'static Colors) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn show(self) -> Result<FormResult, Error> {
        if self.items.is_empty() {
            return Ok(FormResult::Accepted(Vec::new()));
        }

        let colors = self.colors.unwrap_or_else(|| crate::ui::detect_theme());
        let preloaded: Vec<Preloaded> = self.items.iter().map(preload).collect();

        // First pass: logical size at scale 1.0.
        let temp_font = Font::load(1.0)?;
        let temp_rows = build_rows(&self.items, &preloaded, &temp_font, colors, 1.0);
        let temp_buttons = [
            Button::new("OK", &temp_font, 1.0),
            Button::new("Cancel", &temp_font, 1.0),
        ];
        let (calc_width, calc_height) = measure(&temp_rows, &temp_buttons, 1.0);
        drop(temp_rows);
        drop(temp_font);

        let (logical_width, logical_height) =
            window_dimensions((calc_width, calc_height), self.window_size);
        tracing::debug!(
            items = self.items.len(),
            logical_width,
            logical_height,
            "form layout"
        );

        let mut window = create_window(logical_width as u16, logical_height as u16)?;
        window.set_title(&self.title)?;

        // Second pass: everything at the compositor's scale.
        let scale = window.scale_factor();
        let font = Font::load(scale)?;
        let physical_width = px(logical_width, scale);
        let physical_height = px(logical_height, scale);

        let mut rows = build_rows(&self.items, &preloaded, &font, colors, scale);
        drop(preloaded);
        place_rows(&mut rows, scale);
        let mut buttons = vec![
            Button::new("OK", &font, scale),
            Button::new("Cancel", &font, scale),
        ];
        place_buttons(&mut buttons, physical_width, physical_height, scale);

        let mut form = Form::new(rows, buttons);
        let mut canvas = Canvas::new(physical_width, physical_height);
        form.draw(&mut canvas, colors, &font, scale);
        window.set_contents(&canvas)?;
        window.show()?;

        let mut shown_cursor = CursorShape::Default;
        loop {
            let first = match form.next_tick() {
                Some(due) => {
                    window.wait_for_event_timeout(due.saturating_duration_since(Instant::now()))?
                }
                None => Some(window.wait_for_event()?),
            };

            let mut needs_redraw = false;
            let mut pending = first;
            while let Some(event) = pending {
                match form.handle(&event) {
                    Step::Continue(redraw) => needs_redraw |= redraw,
                    Step::Accept => return Ok(finish(&self.items, form.values())),
                    Step::Cancel => return Ok(FormResult::Cancelled),
                    Step::Close => return Ok(FormResult::Closed),
                }
                pending = window.poll_for_event()?;
            }

            needs_redraw |= form.tick(Instant::now());

            let cursor = form.cursor_shape();
            if cursor != shown_cursor {
                if let Err(e) = window.set_cursor(cursor) {
                    tracing::debug!("failed to set cursor: {e}");
                }
                shown_cursor = cursor;
            }

            if needs_redraw {
                form.draw(&mut canvas, colors, &font, scale);
                window.set_contents(&canvas)?;
            }
        }
    }
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Picture data decoded once and shared by both layout passes.
enum Preloaded {
    Nothing,
    Image(Option<RgbaImage>),
    Movie(Vec<Frame>),
}

fn preload(item: &ItemSpec) -> Preloaded {
    match item {
        ItemSpec::Image(spec) => Preloaded::Image(match media::load_image(&spec.path) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(path = %spec.path.display(), "failed to load image: {e}");
                None
            }
        }),
        ItemSpec::Movie(spec) => Preloaded::Movie(match media::load_frames(&spec.path) {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!(path = %spec.path.display(), "failed to load movie: {e}");
                Vec::new()
            }
        }),
        _ => Preloaded::Nothing,
    }
}

/// Text shown above a widget, if the widget kind has one.
fn caption_of(item: &ItemSpec) -> Option<&str> {
    let caption = match item {
        ItemSpec::Entry { label }
        | ItemSpec::Calendar { label }
        | ItemSpec::DateTime { label }
        | ItemSpec::Radio { label, .. } => label,
        ItemSpec::List { title, .. } => title,
        ItemSpec::Slider(range) | ItemSpec::Dial(range) => &range.label,
        ItemSpec::Checkbox { .. } | ItemSpec::Image(_) | ItemSpec::Movie(_) | ItemSpec::Clock => {
            return None;
        }
    };
    (!caption.is_empty()).then_some(caption.as_str())
}

fn build_widget(item: &ItemSpec, preloaded: &Preloaded, font: &Font, scale: f32) -> Box<dyn Widget> {
    match item {
        ItemSpec::Entry { .. } => Box::new(TextInput::new(px(BASE_ENTRY_WIDTH, scale), scale)),
        ItemSpec::Checkbox { label, checked } => Box::new(Checkbox::new(label, *checked, font, scale)),
        ItemSpec::List { items, .. } => Box::new(ListView::new(items.clone(), font, scale)),
        ItemSpec::Calendar { .. } => Box::new(Calendar::new(font, scale)),
        ItemSpec::Slider(range) => Box::new(Slider::new(Bounded::from(range), font, scale)),
        ItemSpec::Dial(range) => Box::new(Dial::new(Bounded::from(range), scale)),
        ItemSpec::DateTime { .. } => Box::new(DateTimeEdit::new(font, scale)),
        ItemSpec::Radio { options, .. } => Box::new(RadioGroup::new(options.clone(), font, scale)),
        ItemSpec::Image(spec) => {
            let image = match preloaded {
                Preloaded::Image(image) => image.as_ref(),
                _ => None,
            };
            Box::new(ImageView::open(&spec.path, image, spec.size, font, scale))
        }
        ItemSpec::Movie(spec) => {
            let frames: &[Frame] = match preloaded {
                Preloaded::Movie(frames) => frames,
                _ => &[],
            };
            Box::new(Movie::open(&spec.path, frames, spec.size, font, scale))
        }
        ItemSpec::Clock => Box::new(Clock::new(scale)),
    }
}

struct Row {
    caption: Option<Canvas>,
    caption_y: i32,
    widget: Box<dyn Widget>,
}

fn build_rows(
    items: &[ItemSpec],
    preloaded: &[Preloaded],
    font: &Font,
    colors: &Colors,
    scale: f32,
) -> Vec<Row> {
    items
        .iter()
        .zip(preloaded)
        .map(|(item, preloaded)| Row {
            caption: caption_of(item).map(|text| font.render(text).with_color(colors.text).finish()),
            caption_y: 0,
            widget: build_widget(item, preloaded, font, scale),
        })
        .collect()
}

/// Dialog size that fits every row and the button bar.
fn measure(rows: &[Row], buttons: &[Button], scale: f32) -> (u32, u32) {
    let padding = px(BASE_PADDING, scale);
    let spacing = px(BASE_ROW_SPACING, scale);
    let gap = px(BASE_CAPTION_GAP, scale);

    let mut width = 0;
    let mut height = 0;
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            height += spacing;
        }
        if let Some(caption) = &row.caption {
            width = width.max(caption.width());
            height += caption.height() + gap;
        }
        width = width.max(row.widget.width());
        height += row.widget.height();
    }

    let buttons_width = buttons.iter().map(|b| b.width()).sum::<u32>()
        + buttons.len().saturating_sub(1) as u32 * px(BASE_BUTTON_SPACING, scale);
    width = width.max(buttons_width);

    (
        (width + padding * 2).max(px(BASE_MIN_WIDTH, scale)),
        padding + height + spacing * 2 + px(BASE_BUTTON_HEIGHT, scale) + padding,
    )
}

/// Applies a requested window size over the computed one. Zero keeps the
/// computed dimension; both end up in `1..=MAX_DIMENSION`.
fn window_dimensions(computed: (u32, u32), requested: Option<(u32, u32)>) -> (u32, u32) {
    let pick = |want: u32, have: u32| (if want == 0 { have } else { want }).clamp(1, MAX_DIMENSION);
    match requested {
        Some((w, h)) => (pick(w, computed.0), pick(h, computed.1)),
        None => (pick(0, computed.0), pick(0, computed.1)),
    }
}

fn place_rows(rows: &mut [Row], scale: f32) {
    let padding = px(BASE_PADDING, scale) as i32;
    let spacing = px(BASE_ROW_SPACING, scale) as i32;
    let gap = px(BASE_CAPTION_GAP, scale) as i32;

    let mut y = padding;
    for row in rows {
        if let Some(caption) = &row.caption {
            row.caption_y = y;
            y += caption.height() as i32 + gap;
        }
        row.widget.set_position(padding, y);
        y += row.widget.height() as i32 + spacing;
    }
}

/// Right-aligns the buttons along the bottom edge.
fn place_buttons(buttons: &mut [Button], width: u32, height: u32, scale: f32) {
    let padding = px(BASE_PADDING, scale) as i32;
    let spacing = px(BASE_BUTTON_SPACING, scale) as i32;
    let y = height as i32 - padding - px(BASE_BUTTON_HEIGHT, scale) as i32;

    let mut x = width as i32 - padding;
    for button in buttons.iter_mut().rev() {
        x -= button.width() as i32;
        button.set_position(x, y);
        x -= spacing;
    }
}

/// Next focus index when tabbing, wrapping around and skipping unfocusable rows.
fn cycle_focus(focusable: &[bool], current: Option<usize>, backwards: bool) -> Option<usize> {
    let len = focusable.len();
    if len == 0 {
        return None;
    }
    let start = match (current, backwards) {
        (Some(i), false) => i + 1,
        (Some(i), true) => i + len - 1,
        (None, false) => 0,
        (None, true) => len - 1,
    };
    (0..len)
        .map(|n| {
            if backwards {
                (start + len - n) % len
            } else {
                (start + n) % len
            }
        })
        .find(|&i| focusable[i])
}

/// Outcome of an accepted form. A list left without a selection declines.
fn finish(items: &[ItemSpec], values: Vec<Option<FieldValue>>) -> FormResult {
    let unselected_list = items
        .iter()
        .zip(&values)
        .any(|(item, value)| {
            matches!(item, ItemSpec::List { .. }) && matches!(value, Some(FieldValue::Choice(None)))
        });
    if unselected_list {
        tracing::debug!("form accepted with an unselected list, treating as cancelled");
        return FormResult::Cancelled;
    }
    FormResult::Accepted(values)
}

enum Step {
    Continue(bool),
    Accept,
    Cancel,
    Close,
}

/// Live dialog state: widgets, buttons, and keyboard focus.
///
/// The first button accepts, any other cancels.
struct Form {
    rows: Vec<Row>,
    buttons: Vec<Button>,
    focus: Option<usize>,
    cursor: (i32, i32),
}

impl Form {
    fn new(rows: Vec<Row>, buttons: Vec<Button>) -> Self {
        let mut form = Self {
            rows,
            buttons,
            focus: None,
            cursor: (0, 0),
        };
        form.move_focus(false);
        form
    }

    fn focusable(&self) -> Vec<bool> {
        self.rows.iter().map(|r| r.widget.focusable()).collect()
    }

    fn set_focus(&mut self, index: Option<usize>) -> bool {
        if index == self.focus {
            return false;
        }
        if let Some(row) = self.focus.and_then(|i| self.rows.get_mut(i)) {
            row.widget.set_focus(false);
        }
        if let Some(row) = index.and_then(|i| self.rows.get_mut(i)) {
            row.widget.set_focus(true);
        }
        self.focus = index;
        true
    }

    fn move_focus(&mut self, backwards: bool) -> bool {
        let next = cycle_focus(&self.focusable(), self.focus, backwards);
        self.set_focus(next)
    }

    fn handle(&mut self, event: &WindowEvent) -> Step {
        let mut redraw = false;
        match event {
            WindowEvent::CloseRequested => return Step::Close,
            WindowEvent::RedrawRequested => redraw = true,
            WindowEvent::KeyPress(key) => {
                let shift = key.modifiers.contains(Modifiers::SHIFT);
                match key.keysym {
                    keys::RETURN | keys::KP_ENTER => return Step::Accept,
                    keys::TAB => return Step::Continue(self.move_focus(shift)),
                    keys::ISO_LEFT_TAB => return Step::Continue(self.move_focus(true)),
                    _ => return Step::Continue(self.send_to_focused(event)),
                }
            }
            WindowEvent::KeyRelease(_) | WindowEvent::TextInput(_) => {
                return Step::Continue(self.send_to_focused(event));
            }
            WindowEvent::CursorMove(pos) | WindowEvent::CursorEnter(pos) => {
                self.cursor = (pos.x as i32, pos.y as i32);
            }
            WindowEvent::ButtonPress(MouseButton::Left) => {
                let (cx, cy) = self.cursor;
                let target = self
                    .rows
                    .iter()
                    .position(|r| r.widget.focusable() && r.widget.contains(cx, cy));
                if target.is_some() {
                    redraw |= self.set_focus(target);
                }
            }
            _ => {}
        }

        // Pointer events reach every widget.
        for row in &mut self.rows {
            redraw |= row.widget.process_event(event);
        }
        for (i, button) in self.buttons.iter_mut().enumerate() {
            redraw |= button.process_event(event);
            if button.was_clicked() {
                return if i == 0 { Step::Accept } else { Step::Cancel };
            }
        }
        Step::Continue(redraw)
    }

    fn send_to_focused(&mut self, event: &WindowEvent) -> bool {
        match self.focus.and_then(|i| self.rows.get_mut(i)) {
            Some(row) => row.widget.process_event(event),
            None => false,
        }
    }

    fn cursor_shape(&self) -> CursorShape {
        let (cx, cy) = self.cursor;
        self.rows
            .iter()
            .find(|r| r.widget.contains(cx, cy))
            .map(|r| r.widget.cursor())
            .unwrap_or_default()
    }

    fn next_tick(&self) -> Option<Instant> {
        self.rows.iter().filter_map(|r| r.widget.next_tick()).min()
    }

    fn tick(&mut self, now: Instant) -> bool {
        let mut redraw = false;
        for row in &mut self.rows {
            if row.widget.next_tick().is_some_and(|due| due <= now) {
                redraw |= row.widget.tick(now);
            }
        }
        redraw
    }

    fn values(&self) -> Vec<Option<FieldValue>> {
        self.rows.iter().map(|r| r.widget.value()).collect()
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font, scale: f32) {
        canvas.fill_dialog_bg(
            canvas.width() as f32,
            canvas.height() as f32,
            colors.window_bg,
            colors.window_border,
            colors.window_shadow,
            8.0 * scale,
        );
        for row in &self.rows {
            if let Some(caption) = &row.caption {
                canvas.draw_canvas(caption, row.widget.x(), row.caption_y);
            }
            row.widget.draw_to(canvas, colors, font);
        }
        for button in &self.buttons {
            button.draw_to(canvas, colors, font);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::cli::{MediaSpec, RangeSpec};

    /// Fixed-size stand-in widget.
    struct Block {
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        focusable: bool,
    }

    fn block(w: u32, h: u32, focusable: bool) -> Box<dyn Widget> {
        Box::new(Block {
            x: 0,
            y: 0,
            w,
            h,
            focusable,
        })
    }

    impl Widget for Block {
        fn width(&self) -> u32 {
            self.w
        }
        fn height(&self) -> u32 {
            self.h
        }
        fn x(&self) -> i32 {
            self.x
        }
        fn y(&self) -> i32 {
            self.y
        }
        fn set_position(&mut self, x: i32, y: i32) {
            self.x = x;
            self.y = y;
        }
        fn process_event(&mut self, _event: &WindowEvent) -> bool {
            false
        }
        fn draw_to(&self, _canvas: &mut Canvas, _colors: &Colors, _font: &Font) {}
        fn focusable(&self) -> bool {
            self.focusable
        }
    }

    fn row(caption: Option<(u32, u32)>, widget: Box<dyn Widget>) -> Row {
        Row {
            caption: caption.map(|(w, h)| Canvas::new(w, h)),
            caption_y: 0,
            widget,
        }
    }

    #[test]
    fn rows_stack_with_captions() {
        let mut rows = vec![
            row(Some((50, 20)), block(100, 30, true)),
            row(None, block(80, 10, false)),
        ];
        place_rows(&mut rows, 1.0);

        assert_eq!(rows[0].caption_y, BASE_PADDING as i32);
        let first_y = (BASE_PADDING + 20 + BASE_CAPTION_GAP) as i32;
        assert_eq!(rows[0].widget.y(), first_y);
        assert_eq!(rows[1].widget.y(), first_y + 30 + BASE_ROW_SPACING as i32);
        assert_eq!(rows[1].widget.x(), BASE_PADDING as i32);
    }

    #[test]
    fn measure_respects_minimum_width() {
        let rows = vec![row(Some((50, 20)), block(100, 30, true))];
        let (w, h) = measure(&rows, &[], 1.0);
        assert_eq!(w, BASE_MIN_WIDTH);
        let content = 20 + BASE_CAPTION_GAP + 30;
        assert_eq!(
            h,
            BASE_PADDING * 2 + content + BASE_ROW_SPACING * 2 + BASE_BUTTON_HEIGHT
        );

        let wide = vec![row(None, block(600, 30, false))];
        assert_eq!(measure(&wide, &[], 1.0).0, 600 + BASE_PADDING * 2);
    }

    #[test]
    fn tab_skips_unfocusable_rows_and_wraps() {
        let focusable = [true, false, true, false];
        assert_eq!(cycle_focus(&focusable, None, false), Some(0));
        assert_eq!(cycle_focus(&focusable, Some(0), false), Some(2));
        assert_eq!(cycle_focus(&focusable, Some(2), false), Some(0));
        assert_eq!(cycle_focus(&focusable, Some(0), true), Some(2));
        assert_eq!(cycle_focus(&[false, false], None, false), None);
        assert_eq!(cycle_focus(&[], None, true), None);
    }

    fn key(keysym: u32, modifiers: Modifiers) -> WindowEvent {
        WindowEvent::KeyPress(crate::backend::KeyEvent { keysym, modifiers })
    }

    fn three_row_form() -> Form {
        let mut rows = vec![
            row(None, block(10, 10, false)),
            row(None, block(10, 10, true)),
            row(None, block(10, 10, true)),
        ];
        place_rows(&mut rows, 1.0);
        Form::new(rows, Vec::new())
    }

    #[test]
    fn first_focusable_row_starts_focused() {
        let form = three_row_form();
        assert_eq!(form.focus, Some(1));
        assert_eq!(Form::new(vec![row(None, block(1, 1, false))], Vec::new()).focus, None);
    }

    #[test]
    fn tab_and_shift_tab_move_focus() {
        let mut form = three_row_form();
        assert!(matches!(form.handle(&key(keys::TAB, Modifiers::empty())), Step::Continue(true)));
        assert_eq!(form.focus, Some(2));
        form.handle(&key(keys::TAB, Modifiers::empty()));
        assert_eq!(form.focus, Some(1));
        form.handle(&key(keys::ISO_LEFT_TAB, Modifiers::SHIFT));
        assert_eq!(form.focus, Some(2));
        form.handle(&key(keys::TAB, Modifiers::SHIFT));
        assert_eq!(form.focus, Some(1));
    }

    #[test]
    fn click_focuses_widget_under_cursor() {
        let mut form = three_row_form();
        let target = &form.rows[2].widget;
        let pos = crate::backend::CursorPos {
            x: (target.x() + 1) as i16,
            y: (target.y() + 1) as i16,
        };
        form.handle(&WindowEvent::CursorMove(pos));
        form.handle(&WindowEvent::ButtonPress(MouseButton::Left));
        assert_eq!(form.focus, Some(2));

        // Clicking empty space keeps the current focus.
        form.handle(&WindowEvent::CursorMove(crate::backend::CursorPos { x: 0, y: 0 }));
        form.handle(&WindowEvent::ButtonPress(MouseButton::Left));
        assert_eq!(form.focus, Some(2));
    }

    #[test]
    fn enter_accepts_and_close_closes() {
        let mut form = three_row_form();
        assert!(matches!(form.handle(&key(keys::RETURN, Modifiers::empty())), Step::Accept));
        assert!(matches!(form.handle(&key(keys::KP_ENTER, Modifiers::empty())), Step::Accept));
        assert!(matches!(form.handle(&WindowEvent::CloseRequested), Step::Close));
        assert_eq!(form.values(), vec![None, None, None]);
        assert_eq!(form.next_tick(), None);
    }

    #[test]
    fn captions_follow_item_kind() {
        assert_eq!(
            caption_of(&ItemSpec::Entry {
                label: "Name".into()
            }),
            Some("Name")
        );
        assert_eq!(
            caption_of(&ItemSpec::List {
                title: "Pick".into(),
                items: vec![]
            }),
            Some("Pick")
        );
        assert_eq!(
            caption_of(&ItemSpec::Dial(RangeSpec::new("Knob", 0, 1, 0))),
            Some("Knob")
        );
        assert_eq!(
            caption_of(&ItemSpec::Checkbox {
                label: "x".into(),
                checked: false
            }),
            None
        );
        assert_eq!(
            caption_of(&ItemSpec::Image(MediaSpec {
                path: "a.png".into(),
                size: None
            })),
            None
        );
        assert_eq!(caption_of(&ItemSpec::Calendar { label: String::new() }), None);
    }

    #[test]
    fn unselected_list_declines() {
        let items = vec![
            ItemSpec::List {
                title: "Pick".into(),
                items: vec!["a".into()],
            },
            ItemSpec::Clock,
        ];
        assert_eq!(
            finish(&items, vec![Some(FieldValue::Choice(None)), None]),
            FormResult::Cancelled
        );

        let values = vec![Some(FieldValue::Choice(Some("a".into()))), None];
        assert_eq!(
            finish(&items, values.clone()),
            FormResult::Accepted(values)
        );
    }

    #[test]
    fn accepted_form_exits_zero() {
        let items = vec![ItemSpec::Calendar {
            label: "When".into(),
        }];
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let values = vec![Some(FieldValue::Date(date))];
        assert_eq!(finish(&items, values.clone()).exit_code(), 0);
        assert_eq!(FormResult::Cancelled.exit_code(), 1);
        assert_eq!(FormResult::Closed.exit_code(), 1);
    }

    fn click_at(form: &mut Form, button: usize) -> Step {
        let target = &form.buttons[button];
        let pos = crate::backend::CursorPos {
            x: (target.x() + 2) as i16,
            y: (target.y() + 2) as i16,
        };
        form.handle(&WindowEvent::CursorMove(pos));
        form.handle(&WindowEvent::ButtonPress(MouseButton::Left));
        form.handle(&WindowEvent::ButtonRelease(MouseButton::Left))
    }

    fn form_with_buttons() -> Form {
        let mut buttons = vec![Button::sized("OK", 20, 1.0), Button::sized("Cancel", 40, 1.0)];
        place_buttons(&mut buttons, 400, 200, 1.0);
        Form::new(vec![row(None, block(10, 10, true))], buttons)
    }

    #[test]
    fn ok_button_accepts() {
        let mut form = form_with_buttons();
        assert!(matches!(click_at(&mut form, 0), Step::Accept));
    }

    #[test]
    fn cancel_button_cancels() {
        let mut form = form_with_buttons();
        assert!(matches!(click_at(&mut form, 1), Step::Cancel));
    }

    #[test]
    fn release_away_from_buttons_does_nothing() {
        let mut form = form_with_buttons();
        form.handle(&WindowEvent::CursorMove(crate::backend::CursorPos { x: 1, y: 1 }));
        form.handle(&WindowEvent::ButtonPress(MouseButton::Left));
        let step = form.handle(&WindowEvent::ButtonRelease(MouseButton::Left));
        assert!(matches!(step, Step::Continue(_)));
    }

    #[test]
    fn requested_window_size_is_bounded() {
        assert_eq!(window_dimensions((360, 200), None), (360, 200));
        assert_eq!(window_dimensions((360, 200), Some((0, 500))), (360, 500));
        assert_eq!(
            window_dimensions((360, 200), Some((600_000_000, 1))),
            (MAX_DIMENSION, 1)
        );
        assert_eq!(window_dimensions((0, 0), None), (1, 1));
    }
}
