use playctl_core::{Engine, ErrorCode, EventKind};

fn check_error(status: ErrorCode) {
    if status != ErrorCode::Success {
        eprintln!("playctl-core API error: {status}");
        std::process::exit(1);
    }
}

fn main() {
    println!("playctl-core Basic Example");
    println!("==========================\n");

    let (_engine, client) = Engine::create().expect("failed creating context");

    check_error(client.initialize());
    check_error(client.command_string("loadfile test.mkv"));

    // No real playback pipeline is wired up in this crate (out of scope),
    // so nothing will ever post a Shutdown event on its own. Wake the wait
    // loop after a couple of idle polls to keep this demo terminating.
    for _ in 0..3 {
        let event = client.wait_event(1.0);
        println!("event: {}", event.event_id.as_str());
        if event.event_id == EventKind::Shutdown {
            break;
        }
    }

    check_error(client.command_string("quit"));
    client.destroy();
}
