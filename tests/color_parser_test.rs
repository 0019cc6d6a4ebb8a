use ratatui::style::Color;
use salesdash::config::{rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, Theme};

// Helper to ensure NO_COLOR is not set for color parsing tests
fn ensure_colors_enabled() {
    std::env::remove_var("NO_COLOR");
}

#[test]
fn test_parse_basic_ansi_colors() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    assert_eq!(parser.parse("black").unwrap(), Color::Black);
    assert_eq!(parser.parse("red").unwrap(), Color::Red);
    assert_eq!(parser.parse("green").unwrap(), Color::Green);
    assert_eq!(parser.parse("yellow").unwrap(), Color::Yellow);
    assert_eq!(parser.parse("blue").unwrap(), Color::Blue);
    assert_eq!(parser.parse("magenta").unwrap(), Color::Magenta);
    assert_eq!(parser.parse("cyan").unwrap(), Color::Cyan);
    assert_eq!(parser.parse("white").unwrap(), Color::White);
}

#[test]
fn test_parse_bright_and_gray_names() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    assert_eq!(parser.parse("bright_red").unwrap(), Color::Indexed(9));
    assert_eq!(parser.parse("bright red").unwrap(), Color::Indexed(9));
    assert_eq!(parser.parse("bright_cyan").unwrap(), Color::Indexed(14));
    assert_eq!(parser.parse("gray").unwrap(), Color::Indexed(8));
    assert_eq!(parser.parse("dark grey").unwrap(), Color::Indexed(8));
    assert_eq!(parser.parse("light_gray").unwrap(), Color::Indexed(7));
}

#[test]
fn test_parse_case_and_whitespace() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    assert_eq!(parser.parse("RED").unwrap(), Color::Red);
    assert_eq!(parser.parse("  Cyan ").unwrap(), Color::Cyan);
    assert_eq!(parser.parse("BRIGHT_RED").unwrap(), Color::Indexed(9));
}

#[test]
fn test_parse_hex_colors() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    // Exact result depends on terminal capability
    for hex in ["#ff0000", "#00FF00", "#0000ff", "#000000", "#ffffff"] {
        assert!(parser.parse(hex).is_ok(), "{} should parse", hex);
    }

    assert!(parser.parse("#ff00").is_err());
    assert!(parser.parse("#ff00000").is_err());
    assert!(parser.parse("ff0000").is_err());
    assert!(parser.parse("#gggggg").is_err());
}

#[test]
fn test_parse_indexed_colors() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    assert_eq!(parser.parse("indexed(0)").unwrap(), Color::Indexed(0));
    assert_eq!(parser.parse("indexed(236)").unwrap(), Color::Indexed(236));
    assert_eq!(parser.parse("INDEXED(255)").unwrap(), Color::Indexed(255));

    assert!(parser.parse("indexed(-1)").is_err());
    assert!(parser.parse("indexed(abc)").is_err());
    assert!(parser.parse("indexed()").is_err());
    assert!(parser.parse("indexed(999)").is_err());
}

#[test]
fn test_parse_reset_aliases() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    assert_eq!(parser.parse("reset").unwrap(), Color::Reset);
    assert_eq!(parser.parse("default").unwrap(), Color::Reset);
    assert_eq!(parser.parse("none").unwrap(), Color::Reset);
}

#[test]
fn test_parse_unknown_color_name() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    let result = parser.parse("burnt_sienna");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Unknown color"));
}

#[test]
#[ignore] // This test modifies global environment and may interfere with parallel tests
fn test_no_color_environment() {
    let original = std::env::var("NO_COLOR").ok();
    std::env::set_var("NO_COLOR", "1");

    let parser = ColorParser::new();
    assert_eq!(parser.parse("red").unwrap(), Color::Reset);
    assert_eq!(parser.parse("#ff0000").unwrap(), Color::Reset);
    // Invalid values are still reported
    assert!(parser.parse("not_a_color").is_err());

    match original {
        Some(val) => std::env::set_var("NO_COLOR", val),
        None => std::env::remove_var("NO_COLOR"),
    }
}

#[test]
fn test_rgb_to_256_color() {
    assert_eq!(rgb_to_256_color(0, 0, 0), 16);
    assert_eq!(rgb_to_256_color(255, 255, 255), 231);
    assert!(rgb_to_256_color(128, 128, 128) >= 232);

    assert_eq!(rgb_to_256_color(255, 0, 0), 196);
    assert_eq!(rgb_to_256_color(0, 255, 0), 46);
    assert_eq!(rgb_to_256_color(0, 0, 255), 21);
}

#[test]
fn test_rgb_to_basic_ansi() {
    assert_eq!(rgb_to_basic_ansi(255, 0, 0), Color::Red);
    assert_eq!(rgb_to_basic_ansi(0, 255, 0), Color::Green);
    assert_eq!(rgb_to_basic_ansi(0, 0, 255), Color::Blue);
    assert_eq!(rgb_to_basic_ansi(255, 255, 0), Color::Yellow);
    assert_eq!(rgb_to_basic_ansi(255, 0, 255), Color::Magenta);
    assert_eq!(rgb_to_basic_ansi(0, 255, 255), Color::Cyan);
    assert_eq!(rgb_to_basic_ansi(30, 30, 30), Color::Black);
    assert_eq!(rgb_to_basic_ansi(200, 200, 200), Color::White);
}

#[test]
fn test_theme_from_config() {
    ensure_colors_enabled();

    let config = AppConfig::default();
    let theme = Theme::from_config(&config.theme).expect("Default theme should parse");

    assert_eq!(theme.get("keybind_hints"), Color::Cyan);
    assert_eq!(theme.get("controls_bg"), Color::Indexed(235));
    assert_eq!(theme.get("chart_series_color_7"), Color::Indexed(14));
    assert_eq!(theme.get("unknown_color"), Color::Reset);
}

#[test]
fn test_theme_with_invalid_color() {
    ensure_colors_enabled();

    let mut config = AppConfig::default();
    config.theme.colors.correlation_negative = "invalid_color_name".to_string();

    let result = Theme::from_config(&config.theme);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Unknown color name"));
}
