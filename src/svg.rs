use crate::parallax::{Point, Viewport, tilt};
use crate::render::{Card, align_width, build_stat_row};

const START_Y: i32 = 30;
const LINE_HEIGHT: i32 = 20;
const LEFT_PADDING: f32 = 15.0;
const RIGHT_PADDING: f32 = 30.0;
const CHAR_WIDTH: f32 = 9.6;
const MIN_COL_CHARS: usize = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

pub struct ThemeColors {
    pub bg: &'static str,
    pub text: &'static str,
    pub key: &'static str,
    pub value: &'static str,
    pub cc: &'static str,
    pub counter: &'static str,
}

impl Theme {
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                bg: "#161b22",
                text: "#c9d1d9",
                key: "#ffa657",
                value: "#a5d6ff",
                cc: "#616e7f",
                counter: "#3fb950",
            },
            Theme::Light => ThemeColors {
                bg: "#ffffff",
                text: "#24292f",
                key: "#d73a49",
                value: "#0366d6",
                cc: "#6a737d",
                counter: "#1a7f37",
            },
        }
    }

    /// Suffix used for the exported file name.
    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

#[derive(Clone, Debug)]
pub struct CardStyle {
    pub theme: Theme,
    pub separator: char,
    /// Pointer over the card, in card pixels. Tilts the card towards it.
    pub pointer: Option<Point>,
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn build_header_line(label: &str, align_width: usize) -> String {
    let base = format!("{label} ");
    let dash_count = align_width.saturating_sub(base.len()) + 2;
    format!("{base}{}", "-".repeat(dash_count))
}

enum Line {
    Header(String),
    Blank,
    Counters {
        years: i32,
        months: u32,
        days: u32,
    },
    Stat {
        k: String,
        d: String,
        v: String,
    },
}

fn build_lines(card: &Card, separator: char) -> (Vec<Line>, usize) {
    let rows = card.rows(separator);
    let width = align_width(&rows, MIN_COL_CHARS);

    let mut lines = vec![
        Line::Header(build_header_line("age", width)),
        Line::Counters {
            years: card.age.years,
            months: card.age.months,
            days: card.age.days,
        },
        Line::Blank,
    ];
    for (key, value) in &rows {
        let (k, d, v) = build_stat_row(key, value, width);
        lines.push(Line::Stat { k, d, v });
    }

    (lines, width)
}

/// Main SVG generation function
pub fn generate_svg(card: &Card, style: &CardStyle) -> String {
    let colors = style.theme.colors();
    let (lines, width) = build_lines(card, style.separator);

    let mut tspans = String::new();
    for (i, line) in lines.iter().enumerate() {
        let y = START_Y + (i as i32) * LINE_HEIGHT;
        match line {
            Line::Blank => {}
            Line::Header(text) => {
                tspans.push_str(&format!(
                    r#"<tspan x="{LEFT_PADDING}" y="{y}">{}</tspan>
"#,
                    escape_xml(text)
                ));
            }
            Line::Counters {
                years,
                months,
                days,
            } => {
                tspans.push_str(&format!(
                    r#"<tspan x="{LEFT_PADDING}" y="{y}" class="counter">{years}</tspan><tspan class="cc"> years </tspan>
<tspan class="counter">{months}</tspan><tspan class="cc"> months </tspan>
<tspan class="counter">{days}</tspan><tspan class="cc"> days</tspan>
"#
                ));
            }
            Line::Stat { k, d, v } => {
                tspans.push_str(&format!(
                    r#"<tspan x="{LEFT_PADDING}" y="{y}" class="cc">. </tspan>
<tspan class="key">{}</tspan><tspan class="cc">{}</tspan><tspan class="value">{}</tspan>
"#,
                    escape_xml(k),
                    escape_xml(d),
                    escape_xml(v)
                ));
            }
        }
    }

    // The leading ". " adds two characters to every stat row.
    let w = LEFT_PADDING + (width as f32 + 2.0) * CHAR_WIDTH + RIGHT_PADDING;
    let h = lines.len() as f32 * LINE_HEIGHT as f32 + START_Y as f32;

    let transform = match style.pointer {
        Some(pointer) => format!(
            r#" style="transform: {}; transform-origin: center""#,
            tilt(
                pointer,
                Viewport {
                    width: w as f64,
                    height: h as f64,
                }
            )
            .css_transform()
        ),
        None => String::new(),
    };

    format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{w}px" height="{h}px"
     font-family="ConsolasFallback,Consolas,monospace"
     font-size="16px">

<style>
.key      {{ fill: {key}; }}
.value    {{ fill: {value}; }}
.cc       {{ fill: {cc}; }}
.counter  {{ fill: {counter}; font-weight: bold; }}
</style>

<g{transform}>
<rect width="{w}px" height="{h}px" fill="{bg}" rx="15"/>

<text fill="{text}">
{rows}
</text>
</g>

</svg>
"#,
        w = w,
        h = h,
        bg = colors.bg,
        text = colors.text,
        key = colors.key,
        value = colors.value,
        cc = colors.cc,
        counter = colors.counter,
        transform = transform,
        rows = tspans
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::age::decompose;

    fn card() -> Card {
        let birthdate = NaiveDate::from_ymd_opt(2000, 2, 29).unwrap();
        let today = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        Card {
            birthdate,
            today,
            age: decompose(birthdate, today).unwrap(),
        }
    }

    fn style(theme: Theme) -> CardStyle {
        CardStyle {
            theme,
            separator: ',',
            pointer: None,
        }
    }

    #[test]
    fn themes_use_their_palette() {
        let dark = generate_svg(&card(), &style(Theme::Dark));
        let light = generate_svg(&card(), &style(Theme::Light));
        assert!(dark.contains("fill=\"#161b22\""));
        assert!(light.contains("fill=\"#ffffff\""));
        assert_ne!(dark, light);
    }

    #[test]
    fn contains_counters_and_grouped_totals() {
        let svg = generate_svg(&card(), &style(Theme::Dark));
        assert!(svg.contains(r#"class="counter">21</tspan>"#));
        assert!(svg.contains(r#"class="counter">0</tspan>"#));
        assert!(svg.contains(r#"class="counter">1</tspan>"#));
        assert!(svg.contains("21 years, 0 months, 1 day"));
        // 7671 days since the leap day.
        assert!(svg.contains("7,671"));
        assert!(svg.starts_with("<?xml"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn pointer_tilts_the_card() {
        let mut s = style(Theme::Light);
        s.pointer = Some(Point { x: 0.0, y: 0.0 });
        let svg = generate_svg(&card(), &s);
        // Top-left corner leans the card back and to the left.
        assert!(svg.contains("perspective(1000px) rotateX(-"));
        assert!(svg.contains("rotateY(-"));

        let flat = generate_svg(&card(), &style(Theme::Light));
        assert!(!flat.contains("perspective"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
