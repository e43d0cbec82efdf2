use playctl_core::{Engine, ErrorCode, EventKind, Format};

fn check_error(status: ErrorCode) {
    if status != ErrorCode::Success {
        eprintln!("playctl-core API error: {status}");
        std::process::exit(1);
    }
}

fn main() {
    println!("playctl-core Multi-Client Example");
    println!("==================================\n");

    let (engine, ctx) = Engine::create().expect("failed creating context");
    check_error(ctx.initialize());
    check_error(ctx.command_string("loadfile test.mkv"));

    // A second handle on the same engine, demonstrating that multiple
    // handles can share one engine. The engine (and its one playback
    // thread) is already initialized via `ctx`, so `ctx2` shares it
    // directly without its own `initialize()` call - a second call on
    // any handle would just fail.
    let ctx2 = engine.new_client("main").expect("failed creating second handle");
    check_error(ctx2.set_option("title", Format::String, "number 2"));
    check_error(ctx2.command_string("loadfile test.mkv"));

    println!("handles registered: {} and {}", ctx.name(), ctx2.name());

    for _ in 0..3 {
        let event = ctx.wait_event(1.0);
        println!("event on {}: {}", ctx.name(), event.event_id.as_str());
        if event.event_id == EventKind::Shutdown {
            break;
        }
    }

    check_error(ctx.command_string("quit"));
    check_error(ctx2.command_string("quit"));

    ctx.destroy();
    ctx2.destroy();
}
