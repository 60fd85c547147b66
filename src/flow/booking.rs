//! Client booking flow: specialist → time type → time → name → phone.

use crate::database::models::{Booking, BookingType, NewBooking, Specialist};
use crate::error::Result;
use crate::flow::action::{ClientAction, UrgentDelay};
use crate::flow::keyboards;
use crate::flow::state::{BookingDraft, DialogueState};
use crate::flow::{Delivery, Effect, FlowContext, Media, Reply, Sender, Transition};
use crate::utils::datetime::{format_date, offset_from};
use crate::utils::logging::log_system_event;
use crate::utils::markdown::{bold, escape_markdown};

const INTRO: &str = "Here you can book a session with a professional listener who understands \
the business context instead of looking at everything through theory.";
const SPACE: &str = "A place to speak out, talk through hard decisions and doubts, or simply clear your head.";

/// Welcome screen text.
pub fn welcome_text() -> String {
    format!(
        "👋 {}\n\n{}\n\n{}\n\n{}",
        bold("Welcome!"),
        escape_markdown(INTRO),
        bold("No coaches and no advice"),
        escape_markdown(SPACE),
    )
}

fn welcome(delivery: Delivery) -> Reply {
    Reply::new(welcome_text(), delivery)
        .keyboard(keyboards::welcome())
        .media(Media::Logo)
}

fn not_found() -> Transition {
    Transition::keep().alert("Specialist not found")
}

fn urgent_booking_type(delay: UrgentDelay) -> BookingType {
    match delay {
        UrgentDelay::Minutes15 => BookingType::Urgent15,
        UrgentDelay::Minutes60 => BookingType::Urgent60,
    }
}

fn urgent_label(delay: UrgentDelay) -> &'static str {
    match delay {
        UrgentDelay::Minutes15 => "Within 15 minutes",
        UrgentDelay::Minutes60 => "Within an hour",
    }
}

/// `/start`: clears the conversation and greets the client.
pub async fn handle_start(ctx: &FlowContext<'_>) -> Result<Transition> {
    let specialists = Specialist::list(ctx.db, true).await?;
    if specialists.is_empty() {
        return Ok(Transition::reset().reply(Reply::send(format!(
            "⚠️ {}\n{}",
            escape_markdown("No listeners are available."),
            escape_markdown("Please try again later."),
        ))));
    }

    Ok(Transition::reset().reply(welcome(Delivery::Send)))
}

/// A button of the booking flow was pressed.
pub async fn handle_action(ctx: &FlowContext<'_>, action: ClientAction) -> Result<Transition> {
    match action {
        ClientAction::ChooseSpecialist | ClientAction::BackToList => show_list(ctx).await,
        ClientAction::SelectSpecialist(id) | ClientAction::BackToSpecialist(id) => {
            show_card(ctx, &id).await
        }
        ClientAction::Book(id) | ClientAction::BackToTimeType(id) => {
            show_time_types(ctx, &id).await
        }
        ClientAction::Urgent { delay, specialist_id } => {
            choose_urgent(ctx, delay, &specialist_id).await
        }
        ClientAction::Schedule(id) => show_grid(ctx, &id).await,
        ClientAction::SelectSlot { time, specialist_id } => {
            choose_slot(ctx, time, &specialist_id).await
        }
        ClientAction::BackToStart | ClientAction::Restart => {
            Ok(Transition::reset().reply(welcome(Delivery::Replace)))
        }
    }
}

async fn show_list(ctx: &FlowContext<'_>) -> Result<Transition> {
    let specialists = Specialist::list(ctx.db, true).await?;
    let text = format!("👤 {}", bold("Choose a listener:"));

    Ok(Transition::reset().reply(
        Reply::replace(text)
            .keyboard(keyboards::specialist_list(&specialists))
            .media(Media::Logo),
    ))
}

async fn show_card(ctx: &FlowContext<'_>, specialist_id: &str) -> Result<Transition> {
    let Some(specialist) = Specialist::find_by_id(ctx.db, specialist_id).await? else {
        return Ok(not_found());
    };

    let text = format!(
        "{}\n\n{}",
        bold(&specialist.name),
        escape_markdown(specialist.description_text().unwrap_or("No description yet")),
    );
    let media = match &specialist.photo_file_id {
        Some(file_id) => Media::Photo(file_id.clone()),
        None => Media::Logo,
    };

    Ok(Transition::to(DialogueState::ViewingSpecialist {
        specialist_id: specialist.id.clone(),
    })
    .reply(
        Reply::replace(text)
            .keyboard(keyboards::specialist_card(&specialist.id))
            .media(media),
    ))
}

async fn show_time_types(ctx: &FlowContext<'_>, specialist_id: &str) -> Result<Transition> {
    let Some(specialist) = Specialist::find_by_id(ctx.db, specialist_id).await? else {
        return Ok(not_found());
    };

    let text = format!(
        "👤 {}\n\n🕐 {}",
        bold(&specialist.name),
        escape_markdown("When suits you?"),
    );

    Ok(Transition::to(DialogueState::ChoosingTimeType {
        specialist_id: specialist.id.clone(),
    })
    .reply(
        Reply::replace(text)
            .keyboard(keyboards::time_type(&specialist.id))
            .media(Media::Logo),
    ))
}

async fn show_grid(ctx: &FlowContext<'_>, specialist_id: &str) -> Result<Transition> {
    let Some(specialist) = Specialist::find_by_id(ctx.db, specialist_id).await? else {
        return Ok(not_found());
    };

    let text = format!(
        "👤 {}\n\n🕐 {}",
        bold(&specialist.name),
        escape_markdown("Pick a convenient time:"),
    );

    Ok(Transition::to(DialogueState::ChoosingTime {
        specialist_id: specialist.id.clone(),
    })
    .reply(Reply::replace(text).keyboard(keyboards::time_grid(&specialist.id))))
}

fn name_prompt(specialist_name: &str, time_line: &str) -> String {
    format!(
        "👤 {}\n{}\n\n✍️ {}",
        bold(specialist_name),
        time_line,
        escape_markdown("Enter your name:"),
    )
}

async fn choose_urgent(
    ctx: &FlowContext<'_>,
    delay: UrgentDelay,
    specialist_id: &str,
) -> Result<Transition> {
    let Some(specialist) = Specialist::find_by_id(ctx.db, specialist_id).await? else {
        return Ok(not_found());
    };

    let (date, time) = offset_from(ctx.now, delay.minutes());
    let label = urgent_label(delay);
    let text = name_prompt(&specialist.name, &format!("🚨 {}", bold(label)));

    let draft = BookingDraft {
        specialist_id: specialist.id,
        specialist_name: specialist.name,
        date,
        time,
        booking_type: urgent_booking_type(delay),
        time_label: label.to_lowercase(),
    };

    Ok(Transition::to(DialogueState::EnteringName { draft }).reply(Reply::replace(text)))
}

async fn choose_slot(ctx: &FlowContext<'_>, time: String, specialist_id: &str) -> Result<Transition> {
    let Some(specialist) = Specialist::find_by_id(ctx.db, specialist_id).await? else {
        return Ok(not_found());
    };

    let text = name_prompt(&specialist.name, &format!("🕐 {}", bold(&time)));
    let draft = BookingDraft {
        specialist_id: specialist.id,
        specialist_name: specialist.name,
        date: format_date(ctx.today()),
        time_label: time.clone(),
        time,
        booking_type: BookingType::Scheduled,
    };

    Ok(Transition::to(DialogueState::EnteringName { draft }).reply(Reply::edit(text)))
}

/// Free text while the flow waits for the client's name or phone. Anything else is ignored.
pub async fn handle_text(
    ctx: &FlowContext<'_>,
    state: DialogueState,
    sender: &Sender,
    text: &str,
) -> Result<Transition> {
    match state {
        DialogueState::EnteringName { draft } => Ok(Transition::to(DialogueState::EnteringPhone {
            draft,
            client_name: text.to_string(),
        })
        .reply(Reply::send(format!("📱 {}", escape_markdown("Enter your phone number:"))))),
        DialogueState::EnteringPhone { draft, client_name } => {
            complete_booking(ctx, draft, client_name, sender, text).await
        }
        _ => Ok(Transition::keep()),
    }
}

async fn complete_booking(
    ctx: &FlowContext<'_>,
    draft: BookingDraft,
    client_name: String,
    sender: &Sender,
    phone: &str,
) -> Result<Transition> {
    let booking = NewBooking {
        specialist_id: draft.specialist_id.clone(),
        date: draft.date.clone(),
        time: draft.time.clone(),
        booking_type: draft.booking_type,
        client_name,
        client_phone: phone.to_string(),
        client_username: sender.username.clone(),
        client_user_id: sender.user_id as i64,
    };
    let booking_id = Booking::create(ctx.db, &booking).await?;
    log_system_event(
        "Booking created",
        Some(&format!(
            "#{} {} {} {} ({})",
            booking_id, booking.specialist_id, booking.date, booking.time, booking.booking_type
        )),
    );

    let confirmation = format!(
        "✅ {}\n\n👤 Listener: {}\n🕐 Time: {}\n\n{}",
        bold("Session booked!"),
        bold(&draft.specialist_name),
        bold(&draft.time_label),
        escape_markdown("We will contact you to confirm."),
    );

    let notice = admin_notice(booking_id, &draft, &booking);
    let mut transition = Transition::reset().reply(
        Reply::send(confirmation)
            .keyboard(keyboards::confirmation())
            .media(Media::Logo),
    );
    for admin_id in ctx.admins.ids() {
        transition = transition.with(Effect::Notify {
            chat_id: admin_id as i64,
            text: notice.clone(),
        });
    }

    Ok(transition)
}

fn admin_notice(booking_id: i64, draft: &BookingDraft, booking: &NewBooking) -> String {
    let username = booking
        .client_username
        .as_deref()
        .filter(|u| !u.is_empty())
        .unwrap_or("none");

    format!(
        "🔔 {}\n\n📌 Type: {}\n👤 Listener: {}\n🕐 Time: {}\n\n👤 Client: {}\n📱 Phone: {}\n🆔 @{}",
        bold(&format!("New session #{booking_id}")),
        bold(booking.booking_type.label()),
        escape_markdown(&draft.specialist_name),
        escape_markdown(&draft.time_label),
        bold(&booking.client_name),
        escape_markdown(&booking.client_phone),
        escape_markdown(username),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_text_is_escaped() {
        let text = welcome_text();
        assert!(text.contains("*Welcome\\!*"));
        assert!(text.ends_with("head\\."));
    }

    #[test]
    fn test_admin_notice_contents() {
        let draft = BookingDraft {
            specialist_id: "anna".into(),
            specialist_name: "Anna Ivanova".into(),
            date: "2024-05-10".into(),
            time: "10:15".into(),
            booking_type: BookingType::Urgent15,
            time_label: "within 15 minutes".into(),
        };
        let booking = NewBooking {
            specialist_id: "anna".into(),
            date: draft.date.clone(),
            time: draft.time.clone(),
            booking_type: BookingType::Urgent15,
            client_name: "Ivan".into(),
            client_phone: "+79990000000".into(),
            client_username: None,
            client_user_id: 5,
        };

        let notice = admin_notice(42, &draft, &booking);
        assert!(notice.contains("New session \\#42"));
        assert!(notice.contains("URGENT \\(15 min\\)"));
        assert!(notice.contains("\\+79990000000"));
        assert!(notice.ends_with("@none"));
    }
}
