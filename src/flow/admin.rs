//! Admin control panel: specialists, time slots, bookings and statistics.
//!
//! Every entry point checks the caller against the [`AdminSet`](crate::config::AdminSet)
//! first. Commands and text from outsiders are ignored; button presses get an
//! "access denied" alert. Neither touches the conversation or the store.

use chrono::Duration;

use crate::config::AdminAccess;
use crate::database::models::{
    Booking, BookingFilter, BookingStatus, Specialist, Stats, TimeSlot,
};
use crate::error::{BotError, Result};
use crate::flow::action::{AdminAction, BookingPeriod, SpecialistField};
use crate::flow::keyboards;
use crate::flow::state::DialogueState;
use crate::flow::{Delivery, Effect, FlowContext, Reply, Sender, Transition};
use crate::utils::datetime::{long_date, short_date};
use crate::utils::logging::{log_permission_denied, log_system_event, log_validation_error};
use crate::utils::markdown::{bold, escape_markdown, italic};
use crate::utils::validation::{description_input, normalize_specialist_id, parse_slot_time};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━";
/// Bookings rendered in one list.
pub const BOOKINGS_SHOWN: usize = 10;

/// Message content while an admin capture step is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminInput {
    Text(String),
    /// File id of the largest size of an uploaded photo.
    Photo(String),
}

fn authorize(ctx: &FlowContext<'_>, sender: &Sender, what: &str) -> Option<AdminAccess> {
    match ctx.admins.authorize(sender.user_id) {
        Ok(access) => Some(access),
        Err(_) => {
            log_permission_denied(what, sender.user_id);
            None
        }
    }
}

/// `/admin`: opens the panel for admins, silently ignored for everyone else.
pub async fn handle_command(ctx: &FlowContext<'_>, sender: &Sender) -> Result<Transition> {
    if authorize(ctx, sender, "/admin").is_none() {
        return Ok(Transition::keep());
    }

    let stats = Stats::collect(ctx.db, ctx.today()).await?;
    Ok(Transition::reset().reply(main_panel(&stats, Delivery::Send)))
}

/// An `admin:*` button was pressed.
pub async fn handle_action(
    ctx: &FlowContext<'_>,
    sender: &Sender,
    state: DialogueState,
    action: AdminAction,
) -> Result<Transition> {
    let Some(access) = authorize(ctx, sender, &action.to_string()) else {
        return Ok(Transition::keep().alert("⛔ Access denied"));
    };

    match action {
        AdminAction::Main | AdminAction::CancelAction => {
            let stats = Stats::collect(ctx.db, ctx.today()).await?;
            Ok(Transition::reset().reply(main_panel(&stats, Delivery::Edit)))
        }
        AdminAction::Close => Ok(Transition::keep().with(Effect::Dismiss)),
        AdminAction::Specialists => specialist_list(ctx, false).await,
        AdminAction::SpecialistList { show_all } => specialist_list(ctx, show_all).await,
        AdminAction::ViewSpecialist(id) => view_specialist(ctx, &id).await,
        AdminAction::AddSpecialist => Ok(Transition::to(DialogueState::AddSpecialistId).reply(
            Reply::edit(format!(
                "➕ {}\n{RULE}\n\n{} {}\n{}",
                bold("NEW SPECIALIST"),
                escape_markdown("Step 1/4: Enter the"),
                bold("ID"),
                italic("(latin letters, no spaces)"),
            ))
            .keyboard(keyboards::cancel_input()),
        )),
        AdminAction::SkipPhoto => skip_photo(ctx, access, state).await,
        AdminAction::EditSpecialist { field, id } => start_edit(ctx, field, &id).await,
        AdminAction::ToggleSpecialist(id) => toggle_specialist(ctx, access, &id).await,
        AdminAction::DeleteSpecialist(id) => confirm_delete(ctx, &id).await,
        AdminAction::ConfirmDelete(id) => delete_specialist(ctx, access, &id).await,
        AdminAction::Slots => Ok(Transition::keep().reply(slots_screen(ctx).await?)),
        AdminAction::ToggleSlot(id) => toggle_slot(ctx, access, id).await,
        AdminAction::AddSlot => Ok(Transition::to(DialogueState::AddTimeSlot).reply(
            Reply::edit(format!(
                "➕ {}\n\n{} {}\n{}",
                bold("NEW SLOT"),
                escape_markdown("Enter the time as"),
                bold("HH:MM"),
                italic("(for example: 13:00)"),
            ))
            .keyboard(keyboards::cancel_input()),
        )),
        AdminAction::Bookings => Ok(Transition::keep().reply(
            Reply::edit(format!("📋 {}\n\n{}", bold("BOOKINGS"), escape_markdown("Choose a period:")))
                .keyboard(keyboards::booking_periods()),
        )),
        AdminAction::BookingList(period) => booking_list(ctx, period).await,
        AdminAction::ViewBooking(id) => view_booking(ctx, id).await,
        AdminAction::CancelBooking(id) => cancel_booking(ctx, access, id).await,
        AdminAction::Stats => {
            let stats = Stats::collect(ctx.db, ctx.today()).await?;
            Ok(Transition::keep().reply(
                Reply::edit(stats_text(&stats)).keyboard(keyboards::stats()),
            ))
        }
    }
}

/// Text or photo sent while an admin capture step is active.
pub async fn handle_input(
    ctx: &FlowContext<'_>,
    sender: &Sender,
    state: DialogueState,
    input: AdminInput,
) -> Result<Transition> {
    let Some(access) = authorize(ctx, sender, state.name()) else {
        return Ok(Transition::keep());
    };

    match (state, input) {
        (DialogueState::AddSpecialistId, AdminInput::Text(text)) => {
            capture_specialist_id(ctx, access, &text).await
        }
        (DialogueState::AddSpecialistName { id }, AdminInput::Text(text)) => {
            Ok(Transition::to(DialogueState::AddSpecialistDescription {
                id,
                name: text.trim().to_string(),
            })
            .reply(
                Reply::send(format!(
                    "{} {}\n\n{}\n{}",
                    escape_markdown("Step 3/4: Enter the"),
                    bold("description"),
                    italic("Emoji and line breaks are fine."),
                    italic("Send - to skip."),
                ))
                .keyboard(keyboards::cancel_input()),
            ))
        }
        (DialogueState::AddSpecialistDescription { id, name }, AdminInput::Text(text)) => {
            Ok(Transition::to(DialogueState::AddSpecialistPhoto {
                id,
                name,
                description: description_input(&text),
            })
            .reply(photo_prompt()))
        }
        (DialogueState::AddSpecialistPhoto { id, name, description }, AdminInput::Photo(file_id)) => {
            add_specialist(ctx, access, &id, &name, &description, Some(&file_id), Delivery::Send).await
        }
        (DialogueState::AddSpecialistPhoto { .. }, AdminInput::Text(_)) => {
            Ok(Transition::keep().reply(photo_prompt()))
        }
        (DialogueState::EditSpecialistName { id }, AdminInput::Text(text)) => {
            let name = text.trim();
            edit_specialist(ctx, access, &id, Some(name), None, "Name updated!").await
        }
        (DialogueState::EditSpecialistDescription { id }, AdminInput::Text(text)) => {
            let description = description_input(&text);
            edit_specialist(ctx, access, &id, None, Some(&description), "Description updated!").await
        }
        (DialogueState::EditSpecialistPhoto { id }, AdminInput::Photo(file_id)) => {
            replace_photo(ctx, access, &id, &file_id).await
        }
        (DialogueState::EditSpecialistPhoto { .. }, AdminInput::Text(_)) => Ok(Transition::keep()
            .reply(
                Reply::send(escape_markdown("🖼 Please send a photo."))
                    .keyboard(keyboards::cancel_input()),
            )),
        (DialogueState::AddTimeSlot, AdminInput::Text(text)) => add_slot(ctx, access, &text).await,
        _ => Ok(Transition::keep()),
    }
}

fn main_panel(stats: &Stats, delivery: Delivery) -> Reply {
    let text = format!(
        "🔐 {}\n{RULE}\n\n👥 Specialists: {}\n📅 Today: {}\n📈 Upcoming: {}\n📊 Total: {}",
        bold("ADMIN PANEL"),
        bold(&stats.active_specialists.to_string()),
        bold(&stats.today_bookings.to_string()),
        bold(&stats.upcoming_bookings.to_string()),
        bold(&stats.total_bookings.to_string()),
    );
    Reply::new(text, delivery).keyboard(keyboards::admin_main(stats))
}

fn stats_text(stats: &Stats) -> String {
    format!(
        "📊 {}\n\n👥 Specialists: {}\n\n📅 Today: {}\n📈 Upcoming: {}\n📊 Total: {}\n❌ Cancelled: {}",
        bold("STATISTICS"),
        bold(&stats.active_specialists.to_string()),
        bold(&stats.today_bookings.to_string()),
        bold(&stats.upcoming_bookings.to_string()),
        bold(&stats.total_bookings.to_string()),
        bold(&stats.cancelled_bookings.to_string()),
    )
}

fn photo_prompt() -> Reply {
    Reply::send(format!(
        "{} {} {}\n\n{}",
        escape_markdown("Step 4/4: Send a"),
        bold("photo"),
        escape_markdown("of the specialist"),
        italic("Or press Skip"),
    ))
    .keyboard(keyboards::skip_photo())
}

fn specialist_missing() -> Transition {
    Transition::keep().alert("Specialist not found")
}

// Specialists

async fn specialist_list(ctx: &FlowContext<'_>, show_all: bool) -> Result<Transition> {
    let specialists = Specialist::list(ctx.db, !show_all).await?;
    let text = format!(
        "👥 {}\n{RULE}\n\n{}\n{}",
        bold("SPECIALISTS"),
        escape_markdown("📷 - has a photo"),
        escape_markdown("📵 - no photo"),
    );

    Ok(Transition::keep().reply(
        Reply::edit(text).keyboard(keyboards::admin_specialists(&specialists, show_all)),
    ))
}

fn specialist_detail(specialist: &Specialist) -> Reply {
    let status = if specialist.is_active { "🟢 Active" } else { "🔴 Disabled" };
    let photo = if specialist.photo_file_id.is_some() { "✅ Uploaded" } else { "❌ No photo" };

    let text = format!(
        "👤 {}\n{RULE}\n\n🆔 ID: {}\n📊 Status: {}\n🖼 Photo: {}\n\n📝 {}\n{}",
        bold(&specialist.name),
        escape_markdown(&specialist.id),
        status,
        photo,
        bold("Description:"),
        escape_markdown(specialist.description_text().unwrap_or("-")),
    );
    Reply::edit(text).keyboard(keyboards::admin_specialist(specialist))
}

async fn view_specialist(ctx: &FlowContext<'_>, id: &str) -> Result<Transition> {
    match Specialist::find_by_id(ctx.db, id).await? {
        Some(specialist) => Ok(Transition::keep().reply(specialist_detail(&specialist))),
        None => Ok(specialist_missing()),
    }
}

async fn capture_specialist_id(
    ctx: &FlowContext<'_>,
    access: AdminAccess,
    input: &str,
) -> Result<Transition> {
    let id = match normalize_specialist_id(input) {
        Ok(id) => id,
        Err(err) => {
            log_validation_error("specialist id", input, &err.to_string(), access.user_id);
            let message = match err {
                BotError::Validation(reason) => reason,
                other => other.to_string(),
            };
            return Ok(Transition::keep().reply(
                Reply::send(format!("❌ {}", escape_markdown(&format!("{message}. Enter another ID:"))))
                    .keyboard(keyboards::cancel_input()),
            ));
        }
    };

    if Specialist::find_by_id(ctx.db, &id).await?.is_some() {
        return Ok(Transition::keep().reply(
            Reply::send(escape_markdown("❌ This ID is already taken. Enter another one:"))
                .keyboard(keyboards::cancel_input()),
        ));
    }

    let text = format!(
        "✅ ID: {}\n\n{} {}",
        escape_markdown(&id),
        escape_markdown("Step 2/4: Enter the"),
        bold("name:"),
    );
    Ok(Transition::to(DialogueState::AddSpecialistName { id })
        .reply(Reply::send(text).keyboard(keyboards::cancel_input())))
}

async fn skip_photo(
    ctx: &FlowContext<'_>,
    access: AdminAccess,
    state: DialogueState,
) -> Result<Transition> {
    match state {
        DialogueState::AddSpecialistPhoto { id, name, description } => {
            add_specialist(ctx, access, &id, &name, &description, None, Delivery::Edit).await
        }
        _ => Ok(Transition::keep().alert("Nothing to skip")),
    }
}

async fn add_specialist(
    ctx: &FlowContext<'_>,
    access: AdminAccess,
    id: &str,
    name: &str,
    description: &str,
    photo_file_id: Option<&str>,
    delivery: Delivery,
) -> Result<Transition> {
    match Specialist::create(ctx.db, id, name, description, photo_file_id).await {
        Ok(_) => {}
        Err(BotError::DuplicateKey(_)) => {
            // Someone else took the id between step 1 and now.
            return Ok(Transition::to(DialogueState::AddSpecialistId).reply(
                Reply::send(escape_markdown("❌ This ID is already taken. Enter another one:"))
                    .keyboard(keyboards::cancel_input()),
            ));
        }
        Err(err) => return Err(err),
    }
    log_system_event(
        "Specialist added",
        Some(&format!("{id} by {}", access.user_id)),
    );

    let photo_line = if photo_file_id.is_some() { "🖼 Photo uploaded" } else { "🖼 No photo" };
    let text = format!(
        "✅ {}\n\n👤 {}\n{}",
        bold("Specialist added!"),
        escape_markdown(name),
        photo_line,
    );
    Ok(Transition::reset().reply(Reply::new(text, delivery).keyboard(keyboards::specialist_added())))
}

async fn start_edit(ctx: &FlowContext<'_>, field: SpecialistField, id: &str) -> Result<Transition> {
    let Some(specialist) = Specialist::find_by_id(ctx.db, id).await? else {
        return Ok(specialist_missing());
    };
    let id = specialist.id.clone();

    let (state, text) = match field {
        SpecialistField::Name => (
            DialogueState::EditSpecialistName { id },
            format!(
                "✏️ {}\n\nCurrent: {}\n\n{}",
                bold("EDIT NAME"),
                bold(&specialist.name),
                escape_markdown("Enter the new name:"),
            ),
        ),
        SpecialistField::Description => (
            DialogueState::EditSpecialistDescription { id },
            format!(
                "📝 {}\n\nCurrent:\n{}\n\n{}",
                bold("EDIT DESCRIPTION"),
                escape_markdown(specialist.description_text().unwrap_or("-")),
                escape_markdown("Enter the new one (- to clear):"),
            ),
        ),
        SpecialistField::Photo => (
            DialogueState::EditSpecialistPhoto { id },
            format!(
                "🖼 {}\n\n{}",
                bold("UPLOAD PHOTO"),
                escape_markdown("Send the new photo of the specialist:"),
            ),
        ),
    };

    Ok(Transition::to(state).reply(Reply::edit(text).keyboard(keyboards::cancel_input())))
}

async fn edit_specialist(
    ctx: &FlowContext<'_>,
    access: AdminAccess,
    id: &str,
    name: Option<&str>,
    description: Option<&str>,
    done: &str,
) -> Result<Transition> {
    match Specialist::update(ctx.db, id, name, description).await {
        Ok(_) => {}
        Err(BotError::NotFound(_)) => {
            return Ok(Transition::reset().reply(Reply::send(escape_markdown("❌ Specialist not found"))));
        }
        Err(err) => return Err(err),
    }
    log_system_event("Specialist edited", Some(&format!("{id} by {}", access.user_id)));

    Ok(Transition::reset().reply(
        Reply::send(format!("✅ {}", escape_markdown(done)))
            .keyboard(keyboards::back_to_specialist(id)),
    ))
}

async fn replace_photo(
    ctx: &FlowContext<'_>,
    access: AdminAccess,
    id: &str,
    file_id: &str,
) -> Result<Transition> {
    if Specialist::find_by_id(ctx.db, id).await?.is_none() {
        return Ok(Transition::reset().reply(Reply::send(escape_markdown("❌ Specialist not found"))));
    }
    Specialist::set_photo(ctx.db, id, file_id).await?;
    log_system_event("Specialist photo replaced", Some(&format!("{id} by {}", access.user_id)));

    Ok(Transition::reset().reply(
        Reply::send(escape_markdown("✅ Photo updated!"))
            .keyboard(keyboards::back_to_specialist(id)),
    ))
}

async fn toggle_specialist(ctx: &FlowContext<'_>, access: AdminAccess, id: &str) -> Result<Transition> {
    if Specialist::find_by_id(ctx.db, id).await?.is_none() {
        return Ok(specialist_missing());
    }
    Specialist::toggle_active(ctx.db, id).await?;
    let specialist = Specialist::get(ctx.db, id).await?;
    log_system_event(
        "Specialist toggled",
        Some(&format!("{id} active={} by {}", specialist.is_active, access.user_id)),
    );

    let toast = if specialist.is_active { "Specialist enabled ✅" } else { "Specialist disabled 🔴" };
    Ok(Transition::keep().toast(toast).reply(specialist_detail(&specialist)))
}

async fn confirm_delete(ctx: &FlowContext<'_>, id: &str) -> Result<Transition> {
    let Some(specialist) = Specialist::find_by_id(ctx.db, id).await? else {
        return Ok(specialist_missing());
    };

    let text = format!(
        "⚠️ {}\n\nDelete {}?\n{}",
        bold("DELETE"),
        bold(&specialist.name),
        escape_markdown("This cannot be undone!"),
    );
    Ok(Transition::keep().reply(Reply::edit(text).keyboard(keyboards::confirm_delete(&specialist.id))))
}

async fn delete_specialist(ctx: &FlowContext<'_>, access: AdminAccess, id: &str) -> Result<Transition> {
    Specialist::delete(ctx.db, id).await?;
    log_system_event("Specialist deleted", Some(&format!("{id} by {}", access.user_id)));

    let list = specialist_list(ctx, false).await?;
    Ok(Transition::keep().toast("✅ Deleted").with_all(list.effects))
}

// Time slots

async fn slots_screen(ctx: &FlowContext<'_>) -> Result<Reply> {
    let slots = TimeSlot::list(ctx.db, false).await?;
    let text = format!(
        "🕐 {}\n{RULE}\n\n{}",
        bold("TIME SLOTS"),
        escape_markdown("Tap a slot to switch it on or off:"),
    );
    Ok(Reply::edit(text).keyboard(keyboards::slots(&slots)))
}

async fn toggle_slot(ctx: &FlowContext<'_>, access: AdminAccess, id: i64) -> Result<Transition> {
    if TimeSlot::find_by_id(ctx.db, id).await?.is_none() {
        return Ok(Transition::keep().alert("Slot not found"));
    }
    TimeSlot::toggle(ctx.db, id).await?;
    log_system_event("Time slot toggled", Some(&format!("#{id} by {}", access.user_id)));

    Ok(Transition::keep().toast("✅ Updated").reply(slots_screen(ctx).await?))
}

async fn add_slot(ctx: &FlowContext<'_>, access: AdminAccess, input: &str) -> Result<Transition> {
    let time = match parse_slot_time(input) {
        Ok(time) => time,
        Err(err) => {
            log_validation_error("time slot", input, &err.to_string(), access.user_id);
            return Ok(Transition::keep().reply(
                Reply::send(escape_markdown("❌ Format: HH:MM (for example: 14:30)"))
                    .keyboard(keyboards::cancel_input()),
            ));
        }
    };

    match TimeSlot::create(ctx.db, &time).await {
        Ok(_) => {}
        Err(BotError::DuplicateKey(_)) => {
            return Ok(Transition::keep().reply(
                Reply::send(escape_markdown("❌ This slot already exists"))
                    .keyboard(keyboards::cancel_input()),
            ));
        }
        Err(err) => return Err(err),
    }
    log_system_event("Time slot added", Some(&format!("{time} by {}", access.user_id)));

    Ok(Transition::reset().reply(
        Reply::send(format!("✅ Slot {} {}", bold(&time), escape_markdown("added!")))
            .keyboard(keyboards::back_to_slots()),
    ))
}

// Bookings

fn period_filter(ctx: &FlowContext<'_>, period: BookingPeriod) -> (BookingFilter, &'static str) {
    let today = ctx.today();
    match period {
        BookingPeriod::Today => (BookingFilter::between(today, today), "📅 TODAY"),
        BookingPeriod::Tomorrow => {
            let tomorrow = today + Duration::days(1);
            (BookingFilter::between(tomorrow, tomorrow), "📆 TOMORROW")
        }
        BookingPeriod::Week => (
            BookingFilter::between(today, today + Duration::days(7)),
            "📅 WEEK",
        ),
        BookingPeriod::Cancelled => (
            BookingFilter::with_status(BookingStatus::Cancelled),
            "❌ CANCELLED",
        ),
        BookingPeriod::All => (
            BookingFilter {
                date_from: Some(today),
                ..BookingFilter::default()
            },
            "📋 ALL",
        ),
    }
}

async fn booking_list(ctx: &FlowContext<'_>, period: BookingPeriod) -> Result<Transition> {
    let (filter, title) = period_filter(ctx, period);
    let bookings = Booking::list(ctx.db, &filter).await?;
    let shown = &bookings[..bookings.len().min(BOOKINGS_SHOWN)];

    let mut text = format!("{}\n\n", bold(title));
    if shown.is_empty() {
        text.push_str(&escape_markdown("No bookings"));
    }
    for booking in shown {
        let icon = if booking.booking_type.is_urgent() { "🚨" } else { "📅" };
        text.push_str(&format!(
            "{icon} {} — {}\n    👤 {}\n",
            bold(&format!("{} {}", short_date(&booking.date), booking.time)),
            escape_markdown(&booking.specialist_name),
            escape_markdown(&booking.client_name),
        ));
    }

    Ok(Transition::keep().reply(Reply::edit(text).keyboard(keyboards::booking_list(shown, period))))
}

fn booking_detail(booking: &Booking) -> Reply {
    let status = match booking.status {
        BookingStatus::Confirmed => "✅ Confirmed",
        BookingStatus::Cancelled => "❌ Cancelled",
    };
    let username = booking
        .client_username
        .as_deref()
        .filter(|u| !u.is_empty())
        .unwrap_or("-");

    let text = format!(
        "📋 {}\n\n📌 Type: {}\n👤 Specialist: {}\n📅 Date: {}\n🕐 Time: {}\n\n👤 Client: {}\n📱 Phone: {}\n🆔 @{}\n\n📊 Status: {}",
        bold(&format!("BOOKING #{}", booking.id)),
        escape_markdown(booking.booking_type.label()),
        bold(&booking.specialist_name),
        escape_markdown(&long_date(&booking.date)),
        escape_markdown(&booking.time),
        bold(&booking.client_name),
        escape_markdown(&booking.client_phone),
        escape_markdown(username),
        status,
    );
    Reply::edit(text).keyboard(keyboards::booking_detail(booking))
}

async fn view_booking(ctx: &FlowContext<'_>, id: i64) -> Result<Transition> {
    match Booking::find_by_id(ctx.db, id).await? {
        Some(booking) => Ok(Transition::keep().reply(booking_detail(&booking))),
        None => Ok(Transition::keep().alert("Booking not found")),
    }
}

async fn cancel_booking(ctx: &FlowContext<'_>, access: AdminAccess, id: i64) -> Result<Transition> {
    let Some(booking) = Booking::find_by_id(ctx.db, id).await? else {
        return Ok(Transition::keep().alert("Booking not found"));
    };
    if !booking.is_confirmed() {
        return Ok(Transition::keep()
            .alert("Booking is already cancelled")
            .reply(booking_detail(&booking)));
    }

    Booking::cancel(ctx.db, id).await?;
    log_system_event("Booking cancelled", Some(&format!("#{id} by {}", access.user_id)));

    let booking = Booking::get(ctx.db, id).await?;
    Ok(Transition::keep().toast("✅ Cancelled").reply(booking_detail(&booking)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_panel_counts() {
        let stats = Stats {
            total_bookings: 12,
            today_bookings: 3,
            upcoming_bookings: 5,
            cancelled_bookings: 1,
            active_specialists: 2,
        };
        let reply = main_panel(&stats, Delivery::Send);
        assert!(reply.text.contains("Specialists: *2*"));
        assert!(reply.text.contains("Total: *12*"));
        assert_eq!(reply.keyboard.map(|k| k.inline_keyboard.len()), Some(6));
    }

    #[test]
    fn test_stats_text_includes_cancelled() {
        let stats = Stats {
            cancelled_bookings: 4,
            ..Stats::default()
        };
        assert!(stats_text(&stats).contains("Cancelled: *4*"));
    }
}
