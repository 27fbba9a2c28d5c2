// SPDX: CC0-1.0

use anyhow::Context;
use chrono::{DateTime, Local};
use fn_plot::{
    eval::Idents,
    gnuplot::{self, Chart},
    plot,
    shell::{self, Command},
    stdlib,
    view::{View, DEFAULT_X},
};
#[cfg(not(debug_assertions))]
use std::process::Stdio;
use std::{
    fs::OpenOptions,
    io::{self, stdin, stdout, BufRead, BufWriter, Write},
    path::PathBuf,
    process::{self, Child, ExitCode},
};

const OUTPUT_RES: [u32; 2] = [1920, 1080];

fn output_filename(now: DateTime<Local>, ext: &str) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        ext
    )
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unexpected error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
struct State {
    view: View,
    idents: Idents,
    gnuplot: Option<Child>,
    out_dir: PathBuf,
}

impl State {
    fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            view: View::new(),
            idents: stdlib::standard_idents(),
            gnuplot: None,
            out_dir: out_dir.into(),
        }
    }
}

fn try_main() -> anyhow::Result<()> {
    let mut state = State::new(".");
    let stdin = stdin();
    run(stdin.lock(), BufWriter::new(stdout()), &mut state)
}

// runs commands until "quit" or the end of input
fn run<R: BufRead, W: Write>(mut inp: R, mut out: W, state: &mut State) -> anyhow::Result<()> {
    loop {
        writeln!(out, "f(x) = {}", state.view.expr())?;

        let Some(mut try_cmd) = shell::input(&mut inp, &mut out, "> ")? else {
            writeln!(out)?;
            break;
        };
        try_cmd.make_ascii_lowercase();
        writeln!(out)?;

        if let Ok(cmd) = try_cmd.parse::<Command>() {
            match cmd {
                Command::Help => {
                    for c in Command::exhaustive() {
                        writeln!(out, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }

                Command::Quit => break,

                Command::SetExpr => {
                    let input = shell::input_or_blank(&mut inp, &mut out, "f(x) = ")?;
                    if !input.is_empty() {
                        state.view.set_expr(input);
                        status(&mut out, state)?;
                    }
                }

                Command::PrintTree => match plot::compile(state.view.expr(), &state.idents) {
                    Ok(expr) => shell::dump_tree(&mut out, &expr, format_args!("tree"))?,
                    Err(err) => {
                        shell::expr_invalid(&mut out)?;
                        shell::report(&mut out, &err, &state.idents)?;
                    }
                },

                Command::Plot => {
                    if let Err(err) = plot_expr(&mut out, state) {
                        report_chain(&mut out, &err)?;
                    }
                }

                Command::SetWin => {
                    set_win(&mut inp, &mut out, state)?;
                    status(&mut out, state)?;
                }

                Command::SetYScale => set_y_scale(&mut inp, &mut out, state)?,

                Command::ZoomIn => {
                    state.view.zoom_in();
                    status(&mut out, state)?;
                }

                Command::ZoomOut => {
                    state.view.zoom_out();
                    status(&mut out, state)?;
                }

                Command::Reset => {
                    state.view.reset();
                    status(&mut out, state)?;
                }

                Command::Points => {
                    let view_state = state.view.state();
                    match view_state.error {
                        Some(ref err) => shell::report(&mut out, err, &state.idents)?,
                        None => shell::dump_points(&mut out, &view_state.points)?,
                    }
                }

                Command::Syntax => shell::syntax(&mut out)?,
            }
        } else {
            writeln!(out, r#"Unknown command, try "help" for help"#)?;
        }

        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

// a failed command, with its context, without leaving the shell
fn report_chain<W: Write>(mut out: W, err: &anyhow::Error) -> io::Result<()> {
    writeln!(out, "error: {err}")?;
    for it in err.chain().skip(1) {
        writeln!(out, "  {it}")?;
    }
    Ok(())
}

// summary of the last recompute
fn status<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    let view_state = state.view.state();
    if let Some(ref err) = view_state.error {
        shell::report(&mut out, err, &state.idents)?;
    } else {
        let [y_min, y_max] = state.view.y_domain();
        writeln!(
            out,
            "{n} points, x in {domain}, y in [{y_min}, {y_max}]",
            n = view_state.points.len(),
            domain = state.view.config().domain,
        )?;
    }
    Ok(())
}

fn set_win<R: BufRead, W: Write>(
    mut inp: R,
    mut out: W,
    state: &mut State,
) -> anyhow::Result<()> {
    writeln!(out, "note: leave blank to skip")?;
    writeln!(
        out,
        "note: anything that isn't a number resets to the default ({} to {})",
        DEFAULT_X.start, DEFAULT_X.end
    )?;

    let x = state.view.x().clone();
    let prompt = format!("?x min (is {}) = ", x.start);
    let input = shell::input_or_blank(&mut inp, &mut out, prompt)?;
    if !input.is_empty() {
        state.view.set_x_min(&input);
    }
    let prompt = format!("?x max (is {}) = ", x.end);
    let input = shell::input_or_blank(&mut inp, &mut out, prompt)?;
    if !input.is_empty() {
        state.view.set_x_max(&input);
    }
    Ok(())
}

fn set_y_scale<R: BufRead, W: Write>(
    mut inp: R,
    mut out: W,
    state: &mut State,
) -> anyhow::Result<()> {
    writeln!(out, "note: leave blank to skip")?;

    let auto = state.view.y().auto;
    let prompt = format!("?auto (is {auto}) = ");
    match shell::read_fromstr::<_, _, bool>(&mut inp, &mut out, prompt, true)? {
        Ok(Some(new)) => {
            state.view.set_auto_y(new);
        }
        Ok(None) => {}
        Err(_) => return Ok(()),
    }

    if !state.view.y().auto {
        writeln!(out, "note: anything that isn't a number means automatic")?;
        let [y_min, y_max] = state.view.y_domain();
        let prompt = format!("?y min (is {y_min}) = ");
        let input = shell::input_or_blank(&mut inp, &mut out, prompt)?;
        if !input.is_empty() {
            state.view.set_y_min(&input);
        }
        let prompt = format!("?y max (is {y_max}) = ");
        let input = shell::input_or_blank(&mut inp, &mut out, prompt)?;
        if !input.is_empty() {
            state.view.set_y_max(&input);
        }
    }

    let [y_min, y_max] = state.view.y_domain();
    writeln!(out, "y in [{y_min}, {y_max}]")?;
    Ok(())
}

fn plot_expr<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let view_state = state.view.recompute();
    if let Some(ref err) = view_state.error {
        shell::report(&mut out, err, &state.idents)?;
        return Ok(());
    }

    // set up gnuplot
    if let Some(mut old_child) = state.gnuplot.take() {
        old_child
            .kill()
            .context("failed to kill previous gnuplot child")?;
    }
    let now = Local::now();
    let data_path = state.out_dir.join(output_filename(now, "data"));
    let gnuplot_path = state.out_dir.join(output_filename(now, "gnuplot"));
    let svg_path = state.out_dir.join(output_filename(now, "svg"));
    let data_name = data_path.display().to_string();
    let svg_name = svg_path.display().to_string();
    let mut data = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&data_path)
            .context("failed to open output data file")?,
    );
    let mut script = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&gnuplot_path)
            .context("failed to open output gnuplot file")?,
    );

    let view_state = state.view.state();
    gnuplot::write_data(&mut data, &view_state.points)
        .context("failed to write to output data file")?;
    data.flush()?;
    data.get_mut().sync_data()?;
    drop(data);

    gnuplot::write_script(
        &mut script,
        &Chart {
            expr: state.view.expr(),
            points: &view_state.points,
            y_domain: state.view.y_domain(),
            data_path: &data_name,
            svg_path: &svg_name,
            resolution: OUTPUT_RES,
        },
    )
    .context("failed to write to output gnuplot file")?;
    script.flush()?;
    script.get_mut().sync_data()?;
    drop(script);

    // spawn gnuplot and provide the path to the file
    let mut cmd = process::Command::new("gnuplot");
    cmd.arg("--persist").arg(&gnuplot_path);
    #[cfg(not(debug_assertions))]
    {
        cmd.stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null());
    }
    let child = cmd
        .spawn()
        .context("failed to spawn gnuplot (is it installed and in $PATH?)")?;
    state.gnuplot = Some(child);

    writeln!(out, "plotted {} points to {svg_name}", view_state.points.len())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fn_plot::plot::YBound;

    fn session(input: &str, state: &mut State) -> String {
        let mut out = Vec::new();
        run(input.as_bytes(), &mut out, state).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn end_of_input_ends_the_session() {
        let mut state = State::new(".");
        let text = session("", &mut state);
        assert_eq!(text, "f(x) = x^2\n> \n");

        // also in the middle of a command
        let text = session("zoomin\nwindow\n-1\n", &mut state);
        assert_eq!(text.matches("> ").count(), 3);
        assert!(!text.contains("Unknown command"));
        assert_eq!(state.view.x().start, -1.0);
    }

    #[test]
    fn failed_plot_keeps_the_session() {
        // output files can't be created inside a regular file
        let mut state = State::new(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let text = session("plot\nzoomin\nquit\n", &mut state);
        assert!(text.contains("error: failed to open output data file\n  "));
        assert!(text.contains("points, x in [-3.5, 3.5]"));
        assert!((state.view.x().end - 3.5).abs() < 1e-12);
    }

    #[test]
    fn commands_report_through_the_writer() {
        let mut state = State::new(".");
        let text = session("bogus\nset\nsinx\nyscale\nfalse\n-2\n\nquit\n", &mut state);
        assert!(text.contains(r#"Unknown command, try "help" for help"#));
        assert!(text.contains("unknown identifier 'sinx'"));
        assert!(text.contains("y in [-2, auto]"));
        assert_eq!(state.view.state().y_domain, [YBound::Fixed(-2.0), YBound::Auto]);
    }
}
