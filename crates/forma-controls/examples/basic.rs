//! Example: Basic usage of forma controls

use forma::{Fieldset, FormElementRegistry};
use forma_controls::{ColorPicker, DatePicker, IntegerInput};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut registry = FormElementRegistry::new();
    forma_controls::define_all(&mut registry)?;

    let color = ColorPicker::new(&registry)?;
    color.element.set_name("background")?;
    color.element.set_attribute("value", "#33669980")?;
    color.element.connected()?;
    println!("color value: {}", color.element.value()?);

    color.alpha.set_value("255");
    color.element.handle_input()?;
    println!("color after input: {}", color.element.value()?);
    println!("color form data: {}", color.element.form_entries().to_url_encoded());

    let date = DatePicker::new(&registry)?;
    date.element.set_name("birthday")?;
    date.element.set_required(true)?;
    date.element.connected()?;
    println!(
        "date valid: {} ({})",
        date.element.check_validity(),
        date.element.validation_message()
    );
    date.element.set_value("2024-2-29")?;
    println!("date value: {}", date.element.value()?);

    let count = IntegerInput::new(&registry)?;
    count.set_max(Some(10))?;
    count.element.set_default_value("3")?;
    println!("count: {:?}", count.value_as_integer());

    let fieldset = Fieldset::new().with_legend("Preferences");
    fieldset.add_element(&count.element);
    fieldset.set_disabled(true);
    println!("count disabled: {}", count.element.disabled_state());

    println!("forma v{} done", forma::VERSION);
    Ok(())
}
