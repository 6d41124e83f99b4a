//! Relay session walkthrough: Exercise the directory, observers, and bus.
//!
//! This example simulates the calls a protocol decoder makes over one
//! short session: open a buffer, fill in metadata and nicks, deliver
//! lines, then close everything down.

use relay_buffer::{BufferLine, BufferList, BufferObserver, NickEntry};
use std::sync::Arc;
use std::time::SystemTime;

/// Observer that prints every signal, standing in for a renderer.
struct PrintObserver;

impl BufferObserver for PrintObserver {
    fn on_line_added(&self) {
        println!("  [observer] line added -> re-query");
    }
    fn on_many_lines_added(&self) {
        println!("  [observer] bulk lines added -> re-query");
    }
    fn on_nicklist_changed(&self) {
        println!("  [observer] nicklist changed -> re-query");
    }
    fn on_buffer_closed(&self) {
        println!("  [observer] buffer closed");
    }
}

fn main() {
    println!("Relay Session Walkthrough");
    println!("=========================");
    println!();

    let list = BufferList::new();
    let session_rx = list.events().subscribe();

    // The decoder announces a buffer and fills in its metadata.
    let rust = list.open("0x100");
    rust.set_number(1).unwrap();
    rust.set_full_name("irc.libera.#rust").unwrap();
    rust.set_short_name("#rust").unwrap();
    rust.set_title("Rust discussion").unwrap();

    rust.register_observer(Arc::new(PrintObserver)).unwrap();

    println!("Opened {} ({})", rust.short_name(), rust.pointer());
    println!();

    // Nicklist sync.
    for name in ["alice", "bob", "carol"] {
        rust.add_nick(NickEntry::new(name)).unwrap();
    }
    rust.update_nick(NickEntry::new("alice").with_prefix("@"))
        .unwrap();
    rust.set_nicklist_complete(true).unwrap();
    println!("Nicklist: {:?}", rust.nick_names());
    println!();

    // Live traffic; each line promotes its speaker.
    let lines = [
        ("0x1", "bob", "anyone around?"),
        ("0x2", "carol", "yep"),
        ("0x3", "bob", "great, quick borrowck question"),
    ];
    for (pointer, nick, text) in lines {
        let line = BufferLine::new(pointer, SystemTime::now(), nick, text)
            .with_tag(format!("nick_{nick}"));
        rust.add_line(line).unwrap();
    }
    println!();
    println!("Unread: {}", rust.unread_count());
    println!("Recency order: {:?}", rust.nick_names());
    for line in rust.lines() {
        println!("  <{}> {}", line.sender(), line.message());
    }
    println!();

    // The user read the buffer; the decoder closes the session.
    rust.reset_unread().unwrap();
    list.close_all();

    println!();
    println!("Session events seen on the bus:");
    for event in session_rx.try_iter() {
        println!("  {event:?}");
    }
}
