use std::{
    env,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process,
};

use cyd_touch::{
    CalibrationProfile, GestureEvent, GesturePipeline, Orientation, RawSample, TouchConfig,
};
use embedded_graphics::geometry::Size;

const TAIL_POLLS: u64 = 10;

#[derive(Clone, Copy)]
struct ReplaySample {
    ms: u64,
    raw: Option<RawSample>,
}

struct ReplayEvent {
    ms: u64,
    event: GestureEvent,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let mut trace_path: Option<PathBuf> = None;
    let mut expect_path: Option<PathBuf> = None;
    let mut orientation = Orientation::Portrait;
    let mut verbose = false;

    let mut idx = 1usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--expect" => {
                idx += 1;
                let Some(path) = args.get(idx) else {
                    return Err("missing path after --expect".into());
                };
                expect_path = Some(PathBuf::from(path));
            }
            "--orientation" => {
                idx += 1;
                let Some(value) = args.get(idx) else {
                    return Err("missing value after --orientation".into());
                };
                orientation = parse_orientation(value)
                    .ok_or_else(|| format!("unknown orientation: {value}"))?;
            }
            "--trace" => verbose = true,
            "-h" | "--help" => {
                println!("{}", usage());
                return Ok(());
            }
            value if value.starts_with('-') => {
                return Err(format!("unknown argument: {value}"));
            }
            value => {
                if trace_path.is_some() {
                    return Err("multiple trace paths provided".into());
                }
                trace_path = Some(PathBuf::from(value));
            }
        }
        idx += 1;
    }

    let trace_path = trace_path.ok_or_else(usage)?;
    let samples = parse_trace(&trace_path)?;

    let bounds = if orientation.swaps_axes() {
        Size::new(320, 240)
    } else {
        Size::new(240, 320)
    };
    let mut pipeline = GesturePipeline::new(
        CalibrationProfile::for_orientation(orientation),
        bounds,
        TouchConfig::DEFAULT,
    );

    let mut events: Vec<ReplayEvent> = Vec::new();
    let mut tick = |pipeline: &mut GesturePipeline, ms: u64, raw: Option<RawSample>| {
        let event = pipeline.tick(ms, raw);
        if verbose {
            let trace = pipeline.last_trace();
            println!(
                "trace,{},{},{},{},{},{}",
                trace.now_ms,
                u8::from(trace.present),
                trace.contact_count,
                trace.pending_count,
                trace.ignored_samples,
                trace.phase.label()
            );
        }
        if let Some(event) = event {
            events.push(ReplayEvent { ms, event });
        }
    };

    for replay in &samples {
        tick(&mut pipeline, replay.ms, replay.raw);
    }

    // Captures often stop right at the last contact; keep polling an empty
    // panel so pending releases can resolve.
    if let Some(last) = samples.last() {
        let step_ms = poll_interval_ms(&samples);
        for n in 1..=TAIL_POLLS {
            tick(&mut pipeline, last.ms.saturating_add(step_ms * n), None);
        }
    }

    println!("gesture,ms,kind,x0,y0,x1,y1,duration_ms");
    for ReplayEvent { ms, event } in &events {
        match *event {
            GestureEvent::SingleTap { point } => {
                println!("gesture,{ms},{},{},{},,,", kind_label(event), point.x, point.y);
            }
            GestureEvent::TwoFingerTap { point_a, point_b } => println!(
                "gesture,{ms},{},{},{},{},{},",
                kind_label(event),
                point_a.x,
                point_a.y,
                point_b.x,
                point_b.y
            ),
            GestureEvent::TwoFingerLongPress {
                point_a,
                point_b,
                duration_ms,
            } => println!(
                "gesture,{ms},{},{},{},{},{},{}",
                kind_label(event),
                point_a.x,
                point_a.y,
                point_b.x,
                point_b.y,
                duration_ms
            ),
        }
    }

    if let Some(expect_path) = expect_path {
        let expected = parse_expected_kinds(&expect_path)?;
        let actual: Vec<&'static str> = events.iter().map(|e| kind_label(&e.event)).collect();
        if actual != expected {
            eprintln!("expected kinds: {}", expected.join(","));
            eprintln!("actual kinds:   {}", actual.join(","));
            return Err("gesture sequence mismatch".into());
        }
    }

    Ok(())
}

fn usage() -> String {
    "usage: touch_replay <trace.csv> [--orientation portrait|portrait_flipped|landscape|landscape_flipped] [--trace] [--expect expected_kinds.txt]".to_string()
}

fn poll_interval_ms(samples: &[ReplaySample]) -> u64 {
    samples
        .windows(2)
        .map(|pair| pair[1].ms.saturating_sub(pair[0].ms))
        .find(|dt| *dt > 0)
        .unwrap_or(20)
}

fn parse_orientation(value: &str) -> Option<Orientation> {
    match value.trim().to_ascii_lowercase().as_str() {
        "portrait" => Some(Orientation::Portrait),
        "portrait_flipped" => Some(Orientation::PortraitFlipped),
        "landscape" => Some(Orientation::Landscape),
        "landscape_flipped" => Some(Orientation::LandscapeFlipped),
        _ => None,
    }
}

fn parse_trace(path: &Path) -> Result<Vec<ReplaySample>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out: Vec<ReplaySample> = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if trimmed == "touch_raw,ms,x,y,pressure" {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').collect();
        if parts[0].trim() != "touch_raw" {
            continue;
        }
        if parts.len() < 3 {
            return Err(format!(
                "{}:{} invalid trace line, expected at least 3 columns",
                path.display(),
                line_no
            ));
        }

        let ms = parse_u64(parts[1], path, line_no, "ms")?;
        // `-` marks a poll where the controller reported no contact.
        let raw = if parts[2].trim() == "-" {
            None
        } else {
            if parts.len() < 5 {
                return Err(format!(
                    "{}:{} invalid trace line, expected x,y,pressure",
                    path.display(),
                    line_no
                ));
            }
            Some(RawSample::new(
                parse_u16(parts[2], path, line_no, "x")?,
                parse_u16(parts[3], path, line_no, "y")?,
                parse_u16(parts[4], path, line_no, "pressure")?,
            ))
        };

        out.push(ReplaySample { ms, raw });
    }

    Ok(out)
}

fn parse_expected_kinds(path: &Path) -> Result<Vec<&'static str>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut kinds = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }

        let normalized = normalize_kind(token).ok_or_else(|| {
            format!(
                "{}:{} invalid expected gesture kind: {}",
                path.display(),
                line_no,
                token
            )
        })?;
        kinds.push(normalized);
    }

    Ok(kinds)
}

fn normalize_kind(kind: &str) -> Option<&'static str> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "single_tap" | "tap" => Some("single_tap"),
        "two_finger_tap" => Some("two_finger_tap"),
        "two_finger_long_press" | "long_press" => Some("two_finger_long_press"),
        _ => None,
    }
}

fn kind_label(event: &GestureEvent) -> &'static str {
    match event {
        GestureEvent::SingleTap { .. } => "single_tap",
        GestureEvent::TwoFingerTap { .. } => "two_finger_tap",
        GestureEvent::TwoFingerLongPress { .. } => "two_finger_long_press",
    }
}

fn parse_u64(raw: &str, path: &Path, line_no: usize, field: &str) -> Result<u64, String> {
    raw.trim().parse::<u64>().map_err(|e| {
        format!(
            "{}:{} invalid {} '{}': {}",
            path.display(),
            line_no,
            field,
            raw.trim(),
            e
        )
    })
}

fn parse_u16(raw: &str, path: &Path, line_no: usize, field: &str) -> Result<u16, String> {
    raw.trim().parse::<u16>().map_err(|e| {
        format!(
            "{}:{} invalid {} '{}': {}",
            path.display(),
            line_no,
            field,
            raw.trim(),
            e
        )
    })
}
