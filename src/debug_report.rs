use timexer::{Annotated, CandidateSummary, Timex};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(out: &Annotated, verbose: bool, color: bool) {
    let palette = ansi::Palette::new(color);
    let text: Vec<&str> = out.tokens.iter().map(|t| t.text.as_str()).collect();
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Tagging: \"{}\"", text.join(" ")), ansi::CYAN)));

    if verbose {
        println!("\n{}", palette.paint("━━━ Candidates ━━━", ansi::GRAY));
        if out.candidates.is_empty() {
            println!("{}", palette.dim("  No rule matched"));
        }
        for candidate in &out.candidates {
            println!("  {}", fmt_candidate(candidate, &palette));
        }
    }

    println!("\n{}", palette.paint("━━━ Timexes ━━━", ansi::GRAY));
    if out.timexes.is_empty() {
        println!("{}", palette.dim("  No temporal expressions"));
    }
    for timex in &out.timexes {
        print_timex(timex, &palette);
    }

    let m = &out.metrics;
    println!("\n{}", palette.paint("━━━ Run ━━━", ansi::GRAY));
    println!(
        "  fired {}  │  vetoed {}  │  pruned {}  │  merged {}  │  anchored {}  │  split {}",
        m.fired, m.vetoed, m.pruned, m.merged, m.anchored, m.split
    );
    println!(
        "  Total: {}  │  Extraction: {}  │  Resolution: {}",
        palette.paint(format!("{:?}", m.total), ansi::GREEN),
        palette.paint(format!("{:?}", m.extraction), ansi::CYAN),
        palette.dim(format!("{:?}", m.resolution)),
    );
    println!();
}

fn print_timex(timex: &Timex, palette: &ansi::Palette) {
    let value = timex.value.as_deref().unwrap_or("?");
    let text = if timex.implicit { palette.dim("(implicit)") } else { format!("\"{}\"", timex.text) };
    println!(
        "  {} {} {} {} {}",
        palette.paint(format!("[{}]", timex.tid), ansi::GRAY),
        palette.paint(timex.kind.as_str(), ansi::BLUE),
        palette.bold(palette.paint(value, ansi::GREEN)),
        palette.dim("│"),
        text,
    );

    let mut extra = Vec::new();
    if let Some(m) = &timex.modifier {
        extra.push(format!("mod={m}"));
    }
    if let Some(q) = &timex.quant {
        extra.push(format!("quant={q}"));
    }
    if let (Some(b), Some(e)) = (&timex.begin_point, &timex.end_point) {
        extra.push(format!("{b}..{e}"));
    }
    if let Some(a) = &timex.anchor_time_id {
        extra.push(format!("anchor={a}"));
    }
    if !extra.is_empty() {
        println!("      {}", palette.paint(extra.join("  "), ansi::YELLOW));
    }
    println!("      {} {}", palette.dim("rule:"), palette.paint(&timex.rule, ansi::CYAN));
}

fn fmt_candidate(c: &CandidateSummary, palette: &ansi::Palette) -> String {
    let fate = match (&c.subsumed_by, c.top_level) {
        (Some(by), _) => palette.dim(format!("✗ inside {by}")),
        (None, true) => palette.paint("✓", ansi::GREEN),
        (None, false) => palette.dim("· part"),
    };
    format!(
        "{} {} {} {} {}",
        palette.paint(format!("{}..{}", c.start, c.end), ansi::YELLOW),
        palette.paint(&c.rule, ansi::BLUE),
        palette.dim(format!("{:?} {}", c.stage, c.instructions.join(", "))),
        c.value.as_deref().unwrap_or(""),
        fate,
    )
}
