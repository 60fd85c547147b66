use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::database::models::{Booking, Specialist, Stats, TimeSlot};
use crate::flow::action::{
    Action, AdminAction, BookingPeriod, ClientAction, SpecialistField, UrgentDelay,
};
use crate::utils::datetime::booking_grid;

const GRID_COLUMNS: usize = 4;
const SLOT_COLUMNS: usize = 3;
/// Bookings in a list that get their own detail button.
pub const BOOKING_SHORTCUTS: usize = 3;

fn button(text: impl Into<String>, action: impl Into<Action>) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, action.into().to_string())
}

fn single(text: impl Into<String>, action: impl Into<Action>) -> Vec<InlineKeyboardButton> {
    vec![button(text, action)]
}

fn back(action: impl Into<Action>) -> Vec<InlineKeyboardButton> {
    single("◀️ Back", action)
}

// Client screens

pub fn welcome() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([single("🎯 Book a session", ClientAction::ChooseSpecialist)])
}

pub fn specialist_list(specialists: &[Specialist]) -> InlineKeyboardMarkup {
    let mut rows: Vec<_> = specialists
        .iter()
        .map(|s| single(format!("👤 {}", s.name), ClientAction::SelectSpecialist(s.id.clone())))
        .collect();
    rows.push(back(ClientAction::BackToStart));
    InlineKeyboardMarkup::new(rows)
}

pub fn specialist_card(specialist_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        single("✅ Book", ClientAction::Book(specialist_id.to_string())),
        back(ClientAction::BackToList),
    ])
}

pub fn time_type(specialist_id: &str) -> InlineKeyboardMarkup {
    let urgent = |delay| ClientAction::Urgent {
        delay,
        specialist_id: specialist_id.to_string(),
    };
    InlineKeyboardMarkup::new([
        single("🚨 Within 15 minutes", urgent(UrgentDelay::Minutes15)),
        single("⏰ Within an hour", urgent(UrgentDelay::Minutes60)),
        single("📅 Choose another time", ClientAction::Schedule(specialist_id.to_string())),
        back(ClientAction::BackToSpecialist(specialist_id.to_string())),
    ])
}

pub fn time_grid(specialist_id: &str) -> InlineKeyboardMarkup {
    let buttons: Vec<_> = booking_grid()
        .into_iter()
        .map(|time| {
            let action = ClientAction::SelectSlot {
                time: time.clone(),
                specialist_id: specialist_id.to_string(),
            };
            button(time, action)
        })
        .collect();

    let mut rows: Vec<Vec<_>> = buttons
        .chunks(GRID_COLUMNS)
        .map(<[InlineKeyboardButton]>::to_vec)
        .collect();
    rows.push(back(ClientAction::BackToTimeType(specialist_id.to_string())));
    InlineKeyboardMarkup::new(rows)
}

pub fn confirmation() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([single("🔄 New session", ClientAction::Restart)])
}

// Admin screens

pub fn admin_main(stats: &Stats) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        single("━━━━━ 📊 STATS ━━━━━", Action::Ignore),
        vec![
            button(
                format!("📅 Today: {}", stats.today_bookings),
                AdminAction::BookingList(BookingPeriod::Today),
            ),
            button(format!("📈 Total: {}", stats.total_bookings), AdminAction::Stats),
        ],
        single("━━━━━ ⚙️ MANAGE ━━━━━", Action::Ignore),
        vec![
            button("👥 Specialists", AdminAction::Specialists),
            button("🕐 Slots", AdminAction::Slots),
        ],
        vec![
            button("📋 Bookings", AdminAction::Bookings),
            button("📊 Stats", AdminAction::Stats),
        ],
        single("❌ Close", AdminAction::Close),
    ])
}

pub fn admin_specialists(specialists: &[Specialist], show_all: bool) -> InlineKeyboardMarkup {
    let mut rows: Vec<_> = specialists
        .iter()
        .map(|s| {
            let status = if s.is_active { "✅" } else { "❌" };
            let photo = if s.photo_file_id.is_some() { "📷" } else { "📵" };
            single(
                format!("{status} {photo} {}", s.name),
                AdminAction::ViewSpecialist(s.id.clone()),
            )
        })
        .collect();

    let filter_label = if show_all { "✅ Active" } else { "👁 All" };
    rows.push(vec![
        button("➕ Add", AdminAction::AddSpecialist),
        button(filter_label, AdminAction::SpecialistList { show_all: !show_all }),
    ]);
    rows.push(back(AdminAction::Main));
    InlineKeyboardMarkup::new(rows)
}

pub fn admin_specialist(specialist: &Specialist) -> InlineKeyboardMarkup {
    let id = &specialist.id;
    let edit = |field| AdminAction::EditSpecialist {
        field,
        id: id.clone(),
    };
    let toggle_label = if specialist.is_active { "🔴 Disable" } else { "🟢 Enable" };
    let photo_label = if specialist.photo_file_id.is_some() {
        "🖼 Change photo"
    } else {
        "📷 Add photo"
    };

    InlineKeyboardMarkup::new([
        vec![
            button("✏️ Name", edit(SpecialistField::Name)),
            button("📝 Description", edit(SpecialistField::Description)),
        ],
        single(photo_label, edit(SpecialistField::Photo)),
        single(toggle_label, AdminAction::ToggleSpecialist(id.clone())),
        single("🗑 Delete", AdminAction::DeleteSpecialist(id.clone())),
        single("◀️ To list", AdminAction::Specialists),
    ])
}

pub fn confirm_delete(specialist_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([vec![
        button("✅ Yes, delete", AdminAction::ConfirmDelete(specialist_id.to_string())),
        button("❌ Cancel", AdminAction::ViewSpecialist(specialist_id.to_string())),
    ]])
}

/// Attached to every capture prompt.
pub fn cancel_input() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([single("❌ Cancel", AdminAction::CancelAction)])
}

pub fn skip_photo() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        single("⏭ Skip", AdminAction::SkipPhoto),
        single("❌ Cancel", AdminAction::CancelAction),
    ])
}

pub fn specialist_added() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        single("👥 To specialists", AdminAction::Specialists),
        single("🏠 Main", AdminAction::Main),
    ])
}

pub fn back_to_specialist(specialist_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([single(
        "◀️ To specialist",
        AdminAction::ViewSpecialist(specialist_id.to_string()),
    )])
}

pub fn slots(slots: &[TimeSlot]) -> InlineKeyboardMarkup {
    let buttons: Vec<_> = slots
        .iter()
        .map(|slot| {
            let status = if slot.is_active { "✅" } else { "❌" };
            button(format!("{status} {}", slot.time), AdminAction::ToggleSlot(slot.id))
        })
        .collect();

    let mut rows: Vec<Vec<_>> = buttons
        .chunks(SLOT_COLUMNS)
        .map(<[InlineKeyboardButton]>::to_vec)
        .collect();
    rows.push(single("➕ Add slot", AdminAction::AddSlot));
    rows.push(back(AdminAction::Main));
    InlineKeyboardMarkup::new(rows)
}

pub fn back_to_slots() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([single("🕐 To slots", AdminAction::Slots)])
}

pub fn booking_periods() -> InlineKeyboardMarkup {
    let period = |label, period| button(label, AdminAction::BookingList(period));
    InlineKeyboardMarkup::new([
        vec![
            period("📅 Today", BookingPeriod::Today),
            period("📆 Tomorrow", BookingPeriod::Tomorrow),
        ],
        vec![
            period("📅 Week", BookingPeriod::Week),
            period("📋 All", BookingPeriod::All),
        ],
        vec![period("❌ Cancelled", BookingPeriod::Cancelled)],
        back(AdminAction::Main),
    ])
}

pub fn booking_list(bookings: &[Booking], period: BookingPeriod) -> InlineKeyboardMarkup {
    let mut rows: Vec<_> = bookings
        .iter()
        .take(BOOKING_SHORTCUTS)
        .map(|b| {
            let name: String = b.client_name.chars().take(20).collect();
            single(format!("📋 {name}"), AdminAction::ViewBooking(b.id))
        })
        .collect();
    rows.push(single("🔄 Refresh", AdminAction::BookingList(period)));
    rows.push(back(AdminAction::Bookings));
    InlineKeyboardMarkup::new(rows)
}

pub fn booking_detail(booking: &Booking) -> InlineKeyboardMarkup {
    let mut rows = Vec::new();
    if booking.is_confirmed() {
        rows.push(single("❌ Cancel booking", AdminAction::CancelBooking(booking.id)));
    }
    rows.push(single("◀️ To bookings", AdminAction::Bookings));
    InlineKeyboardMarkup::new(rows)
}

pub fn stats() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        single("🔄 Refresh", AdminAction::Stats),
        back(AdminAction::Main),
    ])
}
