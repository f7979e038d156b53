use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub focus_border: Color,
    pub blurred_border: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub text_highlight: Color,

    // Specific components
    pub tab_active: Style,
    pub launch_success: Style,
    pub launch_failure: Style,
    pub launch_upcoming: Style,
    pub rocket_active: Style,
    pub rocket_retired: Style,
    pub stat_label: Style,
    pub stat_value: Style,
    pub footer: Style,
    pub loading: Style,
    pub error: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            focus_border: Color::Cyan,
            blurred_border: Color::DarkGray,
            text: Color::White,
            text_secondary: Color::Gray,
            text_highlight: Color::Yellow,

            tab_active: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            launch_success: Style::default().fg(Color::Green),
            launch_failure: Style::default().fg(Color::Red),
            launch_upcoming: Style::default().fg(Color::Blue).add_modifier(Modifier::ITALIC),
            rocket_active: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            rocket_retired: Style::default().fg(Color::DarkGray),
            stat_label: Style::default().fg(Color::Gray),
            stat_value: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            footer: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            loading: Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        }
    }
}
