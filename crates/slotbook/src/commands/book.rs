//! Interactive booking handler.
//!
//! Walks date -> slot -> form -> confirm -> submit against a `BookingFlow`.
//! Values passed as flags skip their prompt; with --no-input nothing is
//! prompted and missing values fail validation.

use std::sync::Arc;

use dialoguer::{Input, Select};
use serde::Serialize;
use strum::IntoEnumIterator;

use slotbook_core::{BookingConfirmation, BookingFlow, Field, FormState, local_today};

use crate::cli::{BookArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{slots, util};

// ── Preset values from flags ────────────────────────────────────────

/// Flag values for one booking round. Consumed as they are used so a
/// follow-up booking prompts for everything.
#[derive(Debug, Default)]
struct Preset {
    date: Option<String>,
    slot: Option<String>,
    name: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    test_type: Option<String>,
}

impl Preset {
    fn from_args(args: &BookArgs) -> Self {
        Self {
            date: args.date.clone(),
            slot: args.slot.clone(),
            name: args.name.clone(),
            address: args.address.clone(),
            phone: args.phone.clone(),
            test_type: args.test_type.clone(),
        }
    }

    fn take(&mut self, field: Field) -> Option<String> {
        match field {
            Field::Name => self.name.take(),
            Field::Address => self.address.take(),
            Field::Phone => self.phone.take(),
            Field::TestType => self.test_type.take(),
        }
    }
}

// ── Confirmation view ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ConfirmationView {
    booking_id: String,
    id_source: String,
    name: String,
    address: String,
    phone: String,
    date: String,
    day: String,
    time_slot: String,
    test_type: String,
}

impl From<&BookingConfirmation> for ConfirmationView {
    fn from(c: &BookingConfirmation) -> Self {
        let r = &c.request;
        Self {
            booking_id: c.booking_id.clone(),
            id_source: c.id_source.to_string(),
            name: r.name.clone(),
            address: r.address.clone(),
            phone: r.phone.clone(),
            date: r.date.to_string(),
            day: r.day_name(),
            time_slot: r.time_slot.clone(),
            test_type: r.test_type.clone(),
        }
    }
}

fn detail(c: &BookingConfirmation, color: bool) -> String {
    use std::fmt::Write;
    let r = &c.request;
    let mut out = output::success("Booking confirmed", color);
    let _ = write!(
        out,
        "\n  Booking ID  {}\n  Name        {}\n  Date        {}\n  Time        {}\n  Test        Test Type {}",
        c.booking_id,
        r.name,
        c.formatted_date(),
        r.time_slot,
        r.test_type,
    );
    out
}

fn render_confirmation(c: &BookingConfirmation, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &ConfirmationView::from(c),
        |_| detail(c, color),
        |v| v.booking_id.clone(),
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(flow: &BookingFlow, args: BookArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut preset = Preset::from_args(&args);

    loop {
        let Some(confirmation) = book_once(flow, &mut preset, args.fallback, global).await? else {
            return Ok(());
        };
        render_confirmation(&confirmation, global);

        if global.no_input || global.yes {
            return Ok(());
        }
        let again = dialoguer::Confirm::new()
            .with_prompt("Book another slot?")
            .default(false)
            .interact()
            .map_err(util::prompt_err)?;
        if !again {
            return Ok(());
        }

        flow.reset().await?;
        preset = Preset::default();
    }
}

/// One full booking. `Ok(None)` means the user backed out.
async fn book_once(
    flow: &BookingFlow,
    preset: &mut Preset,
    force_fallback: bool,
    global: &GlobalOpts,
) -> Result<Option<Arc<BookingConfirmation>>, CliError> {
    // 1. Date
    let date = match preset.date.take() {
        Some(raw) => util::parse_date(&raw)?,
        None if global.no_input => local_today(),
        None => {
            let raw: String = Input::new()
                .with_prompt("Date (YYYY-MM-DD)")
                .default(local_today().to_string())
                .validate_with(|v: &String| util::parse_date(v).map(|_| ()).map_err(|e| e.to_string()))
                .interact_text()
                .map_err(util::prompt_err)?;
            util::parse_date(&raw)?
        }
    };

    // 2. Availability
    let pb = util::spinner(&format!("Checking availability for {date}…"), global);
    let listing = flow.select_date(date).await;
    pb.finish_and_clear();
    let listing = listing?;

    if listing.has_no_availability() {
        return Err(CliError::NoAvailability {
            date: date.to_string(),
        });
    }
    slots::print_notices(&listing, global);

    // 3. Slot
    let label = match preset.slot.take() {
        Some(label) => label,
        None if global.no_input => return Err(CliError::NoSlotSelected),
        None => {
            let open: Vec<&str> = listing.available().map(|s| s.label.as_str()).collect();
            let idx = Select::new()
                .with_prompt(format!("Time slot on {date}"))
                .items(&open)
                .default(0)
                .interact()
                .map_err(util::prompt_err)?;
            open.get(idx).map(|s| (*s).to_owned()).ok_or(CliError::NoSlotSelected)?
        }
    };
    flow.select_slot(&label)?;

    // 4. Form
    let mut form = FormState::new(flow.validator().clone());
    for field in Field::iter() {
        match preset.take(field) {
            Some(value) => {
                form.input(field, &value);
            }
            None if global.no_input => {}
            None => prompt_field(&mut form, field, global)?,
        }
    }

    let report = form.validate_all(Some(&label));
    if !report.is_ok() {
        return Err(slotbook_core::CoreError::FieldValidation(report).into());
    }

    // 5. Review
    if !global.quiet {
        let f = form.fields();
        eprintln!(
            "\n  Name     {}\n  Address  {}\n  Phone    {}\n  Slot     {} at {}\n  Test     Test Type {}\n",
            f.name,
            f.address,
            f.phone,
            date.format("%A, %B %-d, %Y"),
            label,
            f.test_type,
        );
    }
    if !util::confirm("Submit this booking?", true, global, true)? {
        output::print_status("Booking not submitted", global.quiet);
        return Ok(None);
    }

    // 6. Submit
    let pb = util::spinner("Submitting booking…", global);
    let result = flow.submit(form.fields()).await;
    pb.finish_and_clear();

    match result {
        Ok(confirmation) => Ok(Some(confirmation)),
        Err(e) if e.offers_fallback() => {
            let color = output::should_color(&global.color);
            tracing::debug!(error = %e, "primary transport failed");
            output::print_status(
                &output::warning("Unable to connect to server. Try alternative method?", color),
                global.quiet,
            );

            // --yes does not cover this: the details leave in the URL.
            let retry = force_fallback
                || (!global.no_input
                    && !global.yes
                    && dialoguer::Confirm::new()
                        .with_prompt(
                            "Send the booking as URL parameters instead? Your details will appear in the request URL",
                        )
                        .default(false)
                        .interact()
                        .map_err(util::prompt_err)?);
            if !retry {
                return Err(e.into());
            }

            let pb = util::spinner("Submitting booking (alternative method)…", global);
            let result = flow.submit_fallback().await;
            pb.finish_and_clear();
            Ok(Some(result?))
        }
        Err(e) => Err(e.into()),
    }
}

/// Prompt for one field until it passes validation.
fn prompt_field(form: &mut FormState, field: Field, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    loop {
        let value = if field == Field::TestType && !form.validator().test_types().is_empty() {
            let types = form.validator().test_types().to_vec();
            let idx = Select::new()
                .with_prompt(field.label())
                .items(&types)
                .default(0)
                .interact()
                .map_err(util::prompt_err)?;
            types.get(idx).cloned().unwrap_or_default()
        } else {
            Input::<String>::new()
                .with_prompt(field.label())
                .allow_empty(true)
                .interact_text()
                .map_err(util::prompt_err)?
        };

        form.input(field, &value);
        match form.blur(field) {
            Ok(()) => return Ok(()),
            Err(message) => eprintln!("{}", output::warning(&message, color)),
        }
    }
}
