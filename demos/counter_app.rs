//! Seeds both views from TOML, mounts them, and clicks the counter.

use stateview::{mount, CounterView, Node, ProfileView, Seed};

const SEED: &str = r#"
[profile]
first_name = "Ada"
last_name = "Lovelace"
age = 3

[counter]
count = 0
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Profile and Counter views ===\n");

    let seed = Seed::from_toml_str(SEED)?;

    println!("1. Mounting profile view");
    let profile = mount(ProfileView::with_state(seed.profile_state()?), |node: Node| {
        println!("   [render] {node}");
    });

    println!("\n2. Renaming");
    profile.component().set_first_name("Augusta Ada");
    profile.component().set_last_name("King");

    println!("\n3. Setting an invalid age");
    if let Err(err) = profile.component().set_age(-1) {
        println!("   rejected: {err}");
    }

    println!("\n4. Mounting counter view");
    let counter = mount(CounterView::with_state(seed.counter_state()), |node: Node| {
        println!("   [render] {node}");
    });

    println!("\n5. Clicking increment five times");
    for _ in 0..5 {
        counter.dispatch(stateview::view::INCREMENT)?;
    }
    println!("   final count: {}", counter.component().get_count());

    println!("\n6. Unmounting");
    drop(counter);
    drop(profile);

    println!("\n✓ Done!");
    Ok(())
}
