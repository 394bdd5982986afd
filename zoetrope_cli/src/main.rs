use std::cell::RefCell;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use zoetrope_bridge::{Runtime, definitions_in};
use zoetrope_fmt::format_source;
use zoetrope_scene::Scene;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let Some(command) = args.get(1).map(String::as_str) else {
        print_usage();
        std::process::exit(2);
    };

    let result = match command {
        "eval" => eval_command(&args),
        "fmt" => fmt_command(&args),
        "defs" => defs_command(&args),
        _ => {
            print_usage();
            Err(format!("unknown command `{command}`"))
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  zoetrope_cli eval <file.zt> [--ticks <n>] [--rate <fps>]");
    eprintln!("  zoetrope_cli fmt <file.zt> [--write]");
    eprintln!("  zoetrope_cli defs <file.zt>");
}

fn script_arg(args: &[String]) -> Result<PathBuf, String> {
    args.get(2)
        .filter(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .ok_or_else(|| "missing script file argument".to_string())
}

fn parse_flag_value(args: &[String], flag: &str) -> Option<String> {
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1).cloned()
}

fn eval_command(args: &[String]) -> Result<(), String> {
    let path = script_arg(args)?;
    let ticks: u32 = match parse_flag_value(args, "--ticks") {
        Some(raw) => raw.parse().map_err(|_| format!("bad tick count `{raw}`"))?,
        None => 0,
    };
    let rate: f32 = match parse_flag_value(args, "--rate") {
        Some(raw) => raw.parse().map_err(|_| format!("bad tick rate `{raw}`"))?,
        None => 60.0,
    };

    let scene = Rc::new(RefCell::new(Scene::new()));
    let mut runtime = Runtime::new(Box::new(Rc::clone(&scene)));
    runtime.new_session(&path);

    let result = runtime
        .eval()
        .map_err(|err| format!("{}: {err}", path.display()))?;
    println!("=> {result}");

    for frame in 0..ticks {
        runtime.tick(frame as f32 / rate);
    }

    let scene = scene.borrow();
    for animation in scene.animations() {
        println!(
            "animation `{}`: {}s, {} nodes, light at {}",
            animation.name,
            animation.length,
            animation.root.node_count(),
            animation.light_pos,
        );
    }
    if runtime.driver_count() > 0 {
        println!("{} tick driver(s) registered", runtime.driver_count());
    }
    Ok(())
}

fn fmt_command(args: &[String]) -> Result<(), String> {
    let path = script_arg(args)?;
    let text = fs::read_to_string(&path)
        .map_err(|err| format!("can't open file '{}': {err}", path.display()))?;
    let canonical =
        format_source(&text).map_err(|err| format!("{}: {err}", path.display()))?;

    if args.iter().any(|a| a == "--write") {
        fs::write(&path, canonical)
            .map_err(|err| format!("can't write '{}': {err}", path.display()))?;
    } else {
        print!("{canonical}");
    }
    Ok(())
}

fn defs_command(args: &[String]) -> Result<(), String> {
    let path = script_arg(args)?;
    let text = fs::read_to_string(&path)
        .map_err(|err| format!("can't open file '{}': {err}", path.display()))?;
    for (line, name) in definitions_in(&text).map_err(|err| err.to_string())? {
        println!("{line}: {name}");
    }
    Ok(())
}
