use anyhow::Result;
use chrono::NaiveDateTime;
use session_booking_bot::config::AdminSet;
use session_booking_bot::database::{connection::DatabaseManager, models::*};
use session_booking_bot::flow::admin::{self, AdminInput};
use session_booking_bot::flow::{
    Action, AdminAction, Delivery, DialogueState, Effect, FlowContext, Sender, Transition,
};
use tempfile::{tempdir, TempDir};
use tokio_test::assert_ok;

const ADMIN_ID: u64 = 100;

struct Harness {
    db: DatabaseManager,
    admins: AdminSet,
    _temp_dir: TempDir,
}

impl Harness {
    async fn new() -> Result<Self> {
        let temp_dir = tempdir()?;
        let database_url = format!("sqlite:{}", temp_dir.path().join("test.db").display());
        let db = DatabaseManager::new(&database_url).await?;
        db.run_migrations().await?;
        db.seed_defaults().await?;

        Ok(Self {
            db,
            admins: AdminSet::new([ADMIN_ID]),
            _temp_dir: temp_dir,
        })
    }

    fn ctx(&self) -> FlowContext<'_> {
        let now = NaiveDateTime::parse_from_str("2024-05-10 10:00", "%Y-%m-%d %H:%M").unwrap();
        FlowContext::new(&self.db.pool, &self.admins, now)
    }

    async fn book(&self, date: &str, client_name: &str) -> Result<i64> {
        let id = Booking::create(
            &self.db.pool,
            &NewBooking {
                specialist_id: "anna".to_string(),
                date: date.to_string(),
                time: "10:00".to_string(),
                booking_type: BookingType::Scheduled,
                client_name: client_name.to_string(),
                client_phone: "+79990000000".to_string(),
                client_username: None,
                client_user_id: 1,
            },
        )
        .await?;
        Ok(id)
    }
}

fn admin() -> Sender {
    Sender::new(ADMIN_ID, Some("boss".to_string()))
}

fn outsider() -> Sender {
    Sender::new(555, Some("mallory".to_string()))
}

fn action(token: &str) -> AdminAction {
    match token.parse::<Action>().unwrap() {
        Action::Admin(action) => action,
        other => panic!("not an admin action: {other:?}"),
    }
}

fn text(input: &str) -> AdminInput {
    AdminInput::Text(input.to_string())
}

fn toasts(transition: &Transition) -> Vec<(String, bool)> {
    transition
        .effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Toast { text, alert } => Some((text.clone(), *alert)),
            _ => None,
        })
        .collect()
}

fn reply_text(transition: &Transition) -> String {
    transition
        .replies()
        .map(|reply| reply.text.clone())
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn test_outsider_cannot_change_anything() -> Result<()> {
    let harness = Harness::new().await?;
    let ctx = harness.ctx();
    let booking_id = harness.book("2024-05-10", "Ivan").await?;
    let slot = TimeSlot::list(&harness.db.pool, false).await?.remove(0);

    let tokens = [
        "admin:main".to_string(),
        "admin:spec:add".to_string(),
        "admin:spec:toggle:anna".to_string(),
        "admin:spec:confirm_delete:anna".to_string(),
        format!("admin:slot:toggle:{}", slot.id),
        format!("admin:booking:cancel:{booking_id}"),
        "admin:stats".to_string(),
    ];
    for token in &tokens {
        let transition = admin::handle_action(&ctx, &outsider(), DialogueState::Idle, action(token)).await?;
        assert_eq!(transition.state, None, "{token}");
        assert_eq!(toasts(&transition), vec![("⛔ Access denied".to_string(), true)], "{token}");
        assert_eq!(transition.replies().count(), 0, "{token}");
    }

    let command = admin::handle_command(&ctx, &outsider()).await?;
    assert_eq!(command, Transition::keep());

    let input = admin::handle_input(&ctx, &outsider(), DialogueState::AddTimeSlot, text("21:30")).await?;
    assert_eq!(input, Transition::keep());

    // Store untouched
    let anna = Specialist::get(&harness.db.pool, "anna").await?;
    assert!(anna.is_active);
    assert!(TimeSlot::find_by_id(&harness.db.pool, slot.id).await?.unwrap().is_active);
    assert!(Booking::get(&harness.db.pool, booking_id).await?.is_confirmed());
    assert_eq!(TimeSlot::list(&harness.db.pool, false).await?.len(), 12);

    Ok(())
}

#[tokio::test]
async fn test_admin_command_opens_panel() -> Result<()> {
    let harness = Harness::new().await?;
    harness.book("2024-05-10", "Ivan").await?;
    harness.book("2024-05-12", "Olga").await?;

    let transition = admin::handle_command(&harness.ctx(), &admin()).await?;

    assert_eq!(transition.state, Some(DialogueState::Idle));
    let reply = transition.replies().next().unwrap();
    assert_eq!(reply.delivery, Delivery::Send);
    assert!(reply.text.contains("ADMIN PANEL"));
    assert!(reply.text.contains("Specialists: *3*"));
    assert!(reply.text.contains("Today: *1*"));
    assert!(reply.text.contains("Upcoming: *2*"));

    Ok(())
}

#[tokio::test]
async fn test_add_specialist_four_steps_with_skip() -> Result<()> {
    let harness = Harness::new().await?;
    let ctx = harness.ctx();

    let step = admin::handle_action(&ctx, &admin(), DialogueState::Idle, AdminAction::AddSpecialist).await?;
    assert_eq!(step.state, Some(DialogueState::AddSpecialistId));

    let step = admin::handle_input(&ctx, &admin(), DialogueState::AddSpecialistId, text("  Dr Who ")).await?;
    let state = step.state.clone().unwrap();
    assert_eq!(state, DialogueState::AddSpecialistName { id: "dr_who".to_string() });

    let step = admin::handle_input(&ctx, &admin(), state, text("Doctor Who")).await?;
    let state = step.state.clone().unwrap();
    assert_eq!(
        state,
        DialogueState::AddSpecialistDescription {
            id: "dr_who".to_string(),
            name: "Doctor Who".to_string(),
        }
    );

    let step = admin::handle_input(&ctx, &admin(), state, text("-")).await?;
    let state = step.state.clone().unwrap();
    assert_eq!(
        state,
        DialogueState::AddSpecialistPhoto {
            id: "dr_who".to_string(),
            name: "Doctor Who".to_string(),
            description: String::new(),
        }
    );

    // Text in the photo step only repeats the prompt
    let step = admin::handle_input(&ctx, &admin(), state.clone(), text("no photo")).await?;
    assert_eq!(step.state, None);
    assert!(reply_text(&step).contains("photo"));
    assert!(Specialist::find_by_id(&harness.db.pool, "dr_who").await?.is_none());

    let done = admin::handle_action(&ctx, &admin(), state, AdminAction::SkipPhoto).await?;
    assert_eq!(done.state, Some(DialogueState::Idle));
    assert_eq!(done.replies().next().unwrap().delivery, Delivery::Edit);

    let created = Specialist::get(&harness.db.pool, "dr_who").await?;
    assert_eq!(created.name, "Doctor Who");
    assert_eq!(created.description_text(), None);
    assert!(created.photo_file_id.is_none());
    assert!(created.is_active);

    Ok(())
}

#[tokio::test]
async fn test_add_specialist_with_photo() -> Result<()> {
    let harness = Harness::new().await?;
    let state = DialogueState::AddSpecialistPhoto {
        id: "olga".to_string(),
        name: "Olga".to_string(),
        description: "Art therapist".to_string(),
    };

    let done = admin::handle_input(
        &harness.ctx(),
        &admin(),
        state,
        AdminInput::Photo("photo-olga".to_string()),
    )
    .await?;
    assert_eq!(done.state, Some(DialogueState::Idle));

    let created = Specialist::get(&harness.db.pool, "olga").await?;
    assert_eq!(created.photo_file_id.as_deref(), Some("photo-olga"));
    assert_eq!(created.description.as_deref(), Some("Art therapist"));

    Ok(())
}

#[tokio::test]
async fn test_specialist_id_rejections_keep_step() -> Result<()> {
    let harness = Harness::new().await?;
    let ctx = harness.ctx();

    let taken = admin::handle_input(&ctx, &admin(), DialogueState::AddSpecialistId, text("ANNA")).await?;
    assert_eq!(taken.state, None);
    assert!(reply_text(&taken).contains("already taken"));

    let blank = admin::handle_input(&ctx, &admin(), DialogueState::AddSpecialistId, text("   ")).await?;
    assert_eq!(blank.state, None);
    assert!(reply_text(&blank).contains("cannot be empty"));

    let long = admin::handle_input(&ctx, &admin(), DialogueState::AddSpecialistId, text(&"x".repeat(33))).await?;
    assert_eq!(long.state, None);
    assert!(reply_text(&long).contains("longer than 32 bytes"));

    Ok(())
}

#[tokio::test]
async fn test_cancel_button_clears_capture() -> Result<()> {
    let harness = Harness::new().await?;
    let state = DialogueState::AddSpecialistName { id: "olga".to_string() };

    let transition = admin::handle_action(&harness.ctx(), &admin(), state, AdminAction::CancelAction).await?;

    assert_eq!(transition.state, Some(DialogueState::Idle));
    assert!(reply_text(&transition).contains("ADMIN PANEL"));
    assert!(Specialist::find_by_id(&harness.db.pool, "olga").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_skip_outside_photo_step() -> Result<()> {
    let harness = Harness::new().await?;

    let transition = admin::handle_action(&harness.ctx(), &admin(), DialogueState::Idle, AdminAction::SkipPhoto).await?;

    assert_eq!(transition.state, None);
    assert_eq!(toasts(&transition), vec![("Nothing to skip".to_string(), true)]);

    Ok(())
}

#[tokio::test]
async fn test_edit_specialist_fields() -> Result<()> {
    let harness = Harness::new().await?;
    let ctx = harness.ctx();

    let start = admin::handle_action(&ctx, &admin(), DialogueState::Idle, action("admin:spec:edit:name:anna")).await?;
    let state = start.state.clone().unwrap();
    assert_eq!(state, DialogueState::EditSpecialistName { id: "anna".to_string() });

    let done = admin::handle_input(&ctx, &admin(), state, text(" Anna I. ")).await?;
    assert_eq!(done.state, Some(DialogueState::Idle));
    assert_eq!(Specialist::get(&harness.db.pool, "anna").await?.name, "Anna I.");

    let done = admin::handle_input(
        &ctx,
        &admin(),
        DialogueState::EditSpecialistDescription { id: "anna".to_string() },
        text("-"),
    )
    .await?;
    assert_eq!(done.state, Some(DialogueState::Idle));
    assert_eq!(Specialist::get(&harness.db.pool, "anna").await?.description_text(), None);

    let photo_state = DialogueState::EditSpecialistPhoto { id: "anna".to_string() };
    let retry = admin::handle_input(&ctx, &admin(), photo_state.clone(), text("here")).await?;
    assert_eq!(retry.state, None);

    let done = admin::handle_input(&ctx, &admin(), photo_state, AdminInput::Photo("new-photo".to_string())).await?;
    assert_eq!(done.state, Some(DialogueState::Idle));
    assert_eq!(
        Specialist::get(&harness.db.pool, "anna").await?.photo_file_id.as_deref(),
        Some("new-photo")
    );

    let missing = admin::handle_action(&ctx, &admin(), DialogueState::Idle, action("admin:spec:edit:desc:ghost")).await?;
    assert_eq!(missing.state, None);
    assert_eq!(toasts(&missing), vec![("Specialist not found".to_string(), true)]);

    Ok(())
}

#[tokio::test]
async fn test_toggle_and_delete_specialist() -> Result<()> {
    let harness = Harness::new().await?;
    let ctx = harness.ctx();

    let toggled = admin::handle_action(&ctx, &admin(), DialogueState::Idle, action("admin:spec:toggle:maria")).await?;
    assert_eq!(toasts(&toggled), vec![("Specialist disabled 🔴".to_string(), false)]);
    assert!(!Specialist::get(&harness.db.pool, "maria").await?.is_active);

    // Asking for confirmation changes nothing
    let ask = admin::handle_action(&ctx, &admin(), DialogueState::Idle, action("admin:spec:delete:maria")).await?;
    assert!(reply_text(&ask).contains("cannot be undone"));
    assert!(Specialist::find_by_id(&harness.db.pool, "maria").await?.is_some());

    let deleted = admin::handle_action(&ctx, &admin(), DialogueState::Idle, action("admin:spec:confirm_delete:maria")).await?;
    assert_eq!(toasts(&deleted), vec![("✅ Deleted".to_string(), false)]);
    assert_eq!(deleted.replies().count(), 1);
    assert!(Specialist::find_by_id(&harness.db.pool, "maria").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_add_time_slot_validation() -> Result<()> {
    let harness = Harness::new().await?;
    let ctx = harness.ctx();

    let start = admin::handle_action(&ctx, &admin(), DialogueState::Idle, AdminAction::AddSlot).await?;
    assert_eq!(start.state, Some(DialogueState::AddTimeSlot));

    for bad in ["25:00", "9:00", "12:60", "noon"] {
        let retry = admin::handle_input(&ctx, &admin(), DialogueState::AddTimeSlot, text(bad)).await?;
        assert_eq!(retry.state, None, "{bad}");
        assert!(reply_text(&retry).contains("HH:MM"), "{bad}");
    }

    let duplicate = admin::handle_input(&ctx, &admin(), DialogueState::AddTimeSlot, text("09:00")).await?;
    assert_eq!(duplicate.state, None);
    assert!(reply_text(&duplicate).contains("already exists"));

    let added = admin::handle_input(&ctx, &admin(), DialogueState::AddTimeSlot, text(" 21:30 ")).await?;
    assert_eq!(added.state, Some(DialogueState::Idle));

    let times: Vec<String> = TimeSlot::list(&harness.db.pool, false)
        .await?
        .into_iter()
        .map(|s| s.time)
        .collect();
    assert_eq!(times.len(), 13);
    assert!(times.contains(&"21:30".to_string()));

    Ok(())
}

#[tokio::test]
async fn test_toggle_time_slot() -> Result<()> {
    let harness = Harness::new().await?;
    let ctx = harness.ctx();
    let slot = TimeSlot::list(&harness.db.pool, false).await?.remove(0);

    let toggled = admin::handle_action(&ctx, &admin(), DialogueState::Idle, AdminAction::ToggleSlot(slot.id)).await?;
    assert_eq!(toasts(&toggled), vec![("✅ Updated".to_string(), false)]);
    assert!(!TimeSlot::find_by_id(&harness.db.pool, slot.id).await?.unwrap().is_active);

    let missing = admin::handle_action(&ctx, &admin(), DialogueState::Idle, AdminAction::ToggleSlot(9999)).await?;
    assert_eq!(toasts(&missing), vec![("Slot not found".to_string(), true)]);

    Ok(())
}

#[tokio::test]
async fn test_cancel_booking_once() -> Result<()> {
    let harness = Harness::new().await?;
    let ctx = harness.ctx();
    let id = harness.book("2024-05-11", "Ivan").await?;

    let view = admin::handle_action(&ctx, &admin(), DialogueState::Idle, AdminAction::ViewBooking(id)).await?;
    assert!(reply_text(&view).contains("11\\.05\\.2024"));

    let cancelled = assert_ok!(
        admin::handle_action(&ctx, &admin(), DialogueState::Idle, AdminAction::CancelBooking(id)).await
    );
    assert_eq!(toasts(&cancelled), vec![("✅ Cancelled".to_string(), false)]);
    assert!(reply_text(&cancelled).contains("Cancelled"));
    assert!(!Booking::get(&harness.db.pool, id).await?.is_confirmed());

    let again = admin::handle_action(&ctx, &admin(), DialogueState::Idle, AdminAction::CancelBooking(id)).await?;
    assert_eq!(toasts(&again), vec![("Booking is already cancelled".to_string(), true)]);

    let missing = admin::handle_action(&ctx, &admin(), DialogueState::Idle, AdminAction::CancelBooking(9999)).await?;
    assert_eq!(toasts(&missing), vec![("Booking not found".to_string(), true)]);

    Ok(())
}

#[tokio::test]
async fn test_booking_list_periods() -> Result<()> {
    let harness = Harness::new().await?;
    let ctx = harness.ctx();

    harness.book("2024-05-09", "alpha").await?;
    harness.book("2024-05-10", "bravo").await?;
    harness.book("2024-05-11", "charlie").await?;
    harness.book("2024-05-16", "delta").await?;
    harness.book("2024-05-20", "echo").await?;
    let cancelled = harness.book("2024-05-10", "foxtrot").await?;
    Booking::cancel(&harness.db.pool, cancelled).await?;

    let cases: [(&str, &[&str]); 5] = [
        ("today", &["bravo"]),
        ("tomorrow", &["charlie"]),
        ("week", &["bravo", "charlie", "delta"]),
        ("all", &["bravo", "charlie", "delta", "echo"]),
        ("cancelled", &["foxtrot"]),
    ];
    let everyone = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"];

    for (period, expected) in cases {
        let token = format!("admin:bookings:{period}");
        let transition = admin::handle_action(&ctx, &admin(), DialogueState::Idle, action(&token)).await?;
        let listing = reply_text(&transition);
        for name in everyone {
            assert_eq!(listing.contains(name), expected.contains(&name), "{period}: {name}");
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_empty_booking_list() -> Result<()> {
    let harness = Harness::new().await?;

    let transition = admin::handle_action(&harness.ctx(), &admin(), DialogueState::Idle, action("admin:bookings:tomorrow")).await?;

    assert!(reply_text(&transition).contains("No bookings"));
    Ok(())
}

#[tokio::test]
async fn test_close_dismisses_panel() -> Result<()> {
    let harness = Harness::new().await?;

    let transition = admin::handle_action(&harness.ctx(), &admin(), DialogueState::Idle, AdminAction::Close).await?;

    assert_eq!(transition.state, None);
    assert_eq!(transition.effects, vec![Effect::Dismiss]);
    Ok(())
}
