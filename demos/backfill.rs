//! Backfill walkthrough: Silent history insertion and double-ended eviction.
//!
//! Uses a tiny capacity so the eviction behavior is visible: live appends
//! drop the oldest line, while prepends past capacity drop the newest
//! line, whatever it is.

use relay_buffer::{Buffer, BufferLine};
use std::time::SystemTime;

fn line(pointer: &str, text: &str) -> BufferLine {
    BufferLine::new(pointer, SystemTime::now(), "history", text)
}

fn print_log(buffer: &Buffer) {
    for l in buffer.lines() {
        println!("  [{}] {}", l.pointer(), l.message());
    }
    println!();
}

fn main() {
    println!("Backfill Walkthrough");
    println!("====================");
    println!();

    let buffer = Buffer::with_capacity("0x200", 5);

    // Two live lines arrive first.
    buffer.add_line(line("L1", "live one")).unwrap();
    buffer.add_line(line("L2", "live two")).unwrap();
    println!("After live traffic (unread {}):", buffer.unread_count());
    print_log(&buffer);

    // Older history arrives newest-first; silent prepends, one batch signal.
    for n in (1..=4).rev() {
        let pointer = format!("H{n}");
        buffer
            .prepend_line_silent(line(&pointer, &format!("history {n}")))
            .unwrap();
    }
    buffer.notify_many_lines_added().unwrap();

    println!(
        "After backfill of 4 lines into capacity 5 (unread still {}):",
        buffer.unread_count()
    );
    print_log(&buffer);

    println!("The final prepend overflowed the capacity, and prepends evict");
    println!("from the back, so the newest live line fell off the tail.");
    println!("Decoders bound backfill requests by the remaining capacity to");
    println!("avoid exactly this.");
    println!();

    // Live traffic resumes and evicts from the front again.
    buffer.add_line(line("L3", "live three")).unwrap();
    println!("After one more live line:");
    print_log(&buffer);
}
