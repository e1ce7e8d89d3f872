// src/display/terminal.rs
//! Terminal-based display implementation

use super::{apply_action, drain_events, strings, Action, LocationView, Screen, UiEvent};
use crate::{
    controller::LocationDisplayController,
    error::{LocationError, Result},
};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::{
    io::{self, Write},
    sync::mpsc::Receiver,
    time::{Duration, Instant},
};

/// One rendered row of the screen
#[derive(Debug, Clone, PartialEq)]
struct Line {
    color: Option<Color>,
    text: String,
}

impl Line {
    fn plain(text: impl Into<String>) -> Self {
        Self { color: None, text: text.into() }
    }

    fn colored(color: Color, text: impl Into<String>) -> Self {
        Self { color: Some(color), text: text.into() }
    }
}

pub struct TerminalDisplay {
    tick: Duration,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self {
            tick: Duration::from_millis(200),
        }
    }

    fn event_loop(
        &self,
        stdout: &mut impl Write,
        controller: &mut LocationDisplayController,
        events: &Receiver<UiEvent>,
    ) -> Result<()> {
        loop {
            drain_events(controller, events);
            self.draw(stdout, controller.screen())?;

            if !event::poll(self.tick)? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let prompt_pending = controller.screen().prompt.is_some();
                if let Some(action) = key_action(key, prompt_pending) {
                    if !apply_action(controller, action) {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn draw(&self, stdout: &mut impl Write, screen: &Screen) -> Result<()> {
        queue!(stdout, MoveTo(0, 0), Clear(ClearType::All))?;
        for (row, line) in screen_lines(screen, Instant::now()).iter().enumerate() {
            queue!(stdout, MoveTo(0, row as u16))?;
            match line.color {
                Some(color) => queue!(stdout, SetForegroundColor(color), Print(&line.text), ResetColor)?,
                None => queue!(stdout, Print(&line.text))?,
            }
        }
        stdout.flush().map_err(LocationError::Io)
    }
}

impl LocationView for TerminalDisplay {
    fn run(self, mut controller: LocationDisplayController, events: Receiver<UiEvent>) -> Result<()> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, Hide, DisableLineWrap)?;

        let result = self.event_loop(&mut stdout, &mut controller, &events);
        controller.shutdown();

        // Restore the terminal even when the loop failed
        execute!(stdout, Show, EnableLineWrap, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        result
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a key press to an action. While the permission prompt is up only the
/// answer keys and quit are live.
fn key_action(key: KeyEvent, prompt_pending: bool) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match (key.code, prompt_pending) {
        (KeyCode::Char('q') | KeyCode::Esc, _) => Some(Action::Quit),
        (KeyCode::Char('y'), true) => Some(Action::AnswerPermission(true)),
        (KeyCode::Char('n'), true) => Some(Action::AnswerPermission(false)),
        (_, true) => None,
        (KeyCode::Char('g'), false) => Some(Action::ToggleAccuracy),
        (KeyCode::Char('u'), false) => Some(Action::ToggleUpdates),
        (KeyCode::Char('r'), false) => Some(Action::RequestAccess),
        _ => None,
    }
}

fn switch(on: bool) -> &'static str {
    if on {
        "[ON ]"
    } else {
        "[OFF]"
    }
}

fn screen_lines(screen: &Screen, now: Instant) -> Vec<Line> {
    let rule = "=".repeat(60);
    let mut lines = vec![
        Line::colored(Color::Green, rule.clone()),
        Line::colored(Color::Green, "Location Display"),
        Line::colored(Color::Green, rule.clone()),
    ];

    let last_update = match (&screen.last_fix, &screen.provider) {
        (Some(ts), Some(provider)) => format!("Last Update: {} ({})", ts.format("%Y-%m-%d %H:%M:%S UTC"), provider),
        _ => "Last Update: No data received".to_string(),
    };
    lines.push(Line::plain(last_update));
    lines.push(Line::plain(""));

    lines.push(Line::colored(Color::Yellow, "LOCATION:"));
    for (label, value) in screen.fields() {
        lines.push(Line::plain(format!("  {:<10} {}", format!("{}:", label), value)));
    }
    lines.push(Line::plain(""));

    lines.push(Line::colored(Color::Cyan, "SWITCHES:"));
    lines.push(Line::plain(format!("  {} High accuracy (g)", switch(screen.high_accuracy))));
    lines.push(Line::plain(format!("  {} Location updates (u)", switch(screen.updates_enabled))));
    lines.push(Line::plain(""));

    if let Some(prompt) = screen.prompt {
        if prompt.rationale {
            lines.push(Line::colored(Color::Magenta, strings::PERMISSION_RATIONALE));
        }
        lines.push(Line::colored(Color::Magenta, format!("{} [y/n]", strings::PERMISSION_PROMPT)));
        lines.push(Line::plain(""));
    }

    if let Some(message) = screen.visible_notice(now) {
        lines.push(Line::colored(Color::Blue, format!(">> {}", message)));
        lines.push(Line::plain(""));
    }

    lines.push(Line::colored(Color::Green, rule));
    lines.push(Line::colored(
        Color::Green,
        "g: accuracy  u: updates  r: request access  q: quit",
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::screen::PermissionPrompt;
    use crate::location::Priority;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(key_action(press(KeyCode::Char('g')), false), Some(Action::ToggleAccuracy));
        assert_eq!(key_action(press(KeyCode::Char('u')), false), Some(Action::ToggleUpdates));
        assert_eq!(key_action(press(KeyCode::Char('r')), false), Some(Action::RequestAccess));
        assert_eq!(key_action(press(KeyCode::Char('y')), false), None);
        assert_eq!(key_action(press(KeyCode::Esc), false), Some(Action::Quit));
        assert_eq!(
            key_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), false),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_prompt_captures_keys() {
        assert_eq!(key_action(press(KeyCode::Char('y')), true), Some(Action::AnswerPermission(true)));
        assert_eq!(key_action(press(KeyCode::Char('n')), true), Some(Action::AnswerPermission(false)));
        assert_eq!(key_action(press(KeyCode::Char('u')), true), None);
        assert_eq!(key_action(press(KeyCode::Char('q')), true), Some(Action::Quit));
    }

    #[test]
    fn test_lines_show_fields_and_switches() {
        let mut screen = Screen::new(Priority::HighAccuracy);
        screen.latitude = "48.117300".to_string();

        let text: Vec<String> = screen_lines(&screen, Instant::now()).into_iter().map(|l| l.text).collect();

        assert!(text.iter().any(|l| l == "  Latitude:  48.117300"));
        assert!(text.iter().any(|l| l == "  [ON ] High accuracy (g)"));
        assert!(text.iter().any(|l| l == "  [OFF] Location updates (u)"));
        assert!(text.iter().any(|l| l == "Last Update: No data received"));
    }

    #[test]
    fn test_lines_show_prompt_and_notice() {
        let mut screen = Screen::new(Priority::BalancedPower);
        screen.prompt = Some(PermissionPrompt { rationale: true });
        screen.show_notice(strings::PERMISSION_RATIONALE);

        let text: Vec<String> = screen_lines(&screen, Instant::now()).into_iter().map(|l| l.text).collect();

        assert!(text.iter().any(|l| l.ends_with("[y/n]")));
        assert!(text.iter().any(|l| l == &format!(">> {}", strings::PERMISSION_RATIONALE)));
    }
}
