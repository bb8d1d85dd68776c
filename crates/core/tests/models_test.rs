use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{from_str, json, to_value};
use serde_test::{assert_tokens, Token};
use slotbook_core::{
    catalogue,
    errors::BookingError,
    models::{
        appointment::{Appointment, AppointmentId, AppointmentStatus, ReservationRequest},
        slot::{Occupancy, SlotMap, SlotTime},
    },
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn slot(s: &str) -> SlotTime {
    s.parse().unwrap()
}

fn request(date: &str, time: &str, name: &str, phone: &str) -> ReservationRequest {
    ReservationRequest {
        date: date.to_string(),
        time: time.to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        reason: None,
    }
}

#[rstest]
#[case::saturday(date(2024, 6, 15), 9, 14)]
#[case::tuesday(date(2024, 6, 11), 8, 19)]
#[case::friday(date(2024, 6, 14), 8, 19)]
fn test_catalogue_hours(#[case] day: NaiveDate, #[case] first: u8, #[case] last: u8) {
    let expected: Vec<SlotTime> = (first..=last)
        .map(|h| SlotTime::from_hour(h).unwrap())
        .collect();

    assert_eq!(catalogue::slots_for(day), expected);
}

#[test]
fn test_catalogue_sunday_is_empty() {
    assert!(catalogue::slots_for(date(2024, 6, 16)).is_empty());
}

#[rstest]
#[case("08:00", 8)]
#[case("19:00", 19)]
#[case("00:00", 0)]
fn test_slot_time_parse(#[case] input: &str, #[case] hour: u8) {
    let time: SlotTime = input.parse().unwrap();
    assert_eq!(time.hour(), hour);
    assert_eq!(time.to_string(), input);
}

#[rstest]
#[case("8:00")]
#[case("08:30")]
#[case("24:00")]
#[case("ab:00")]
#[case("")]
fn test_slot_time_rejects_malformed(#[case] input: &str) {
    assert!(matches!(
        input.parse::<SlotTime>(),
        Err(BookingError::InvalidInput(_))
    ));
}

#[test]
fn test_slot_time_tokens() {
    assert_tokens(&slot("09:00"), &[Token::Str("09:00")]);
}

#[test]
fn test_status_tokens() {
    assert_tokens(&AppointmentStatus::Pending, &[Token::UnitVariant {
        name: "AppointmentStatus",
        variant: "pending",
    }]);
    assert_tokens(&Occupancy::Free, &[Token::UnitVariant {
        name: "Occupancy",
        variant: "free",
    }]);
}

#[test]
fn test_appointment_id_is_date_underscore_time() {
    let id = AppointmentId::for_slot(date(2024, 6, 10), slot("09:00"));

    assert_eq!(id.to_string(), "2024-06-10_09:00");
    assert_eq!("2024-06-10_09:00".parse::<AppointmentId>().unwrap(), id);
    assert!("2024-06-10-09:00".parse::<AppointmentId>().is_err());
}

#[test]
fn test_appointment_ids_order_by_date_then_time() {
    let mut ids = vec![
        AppointmentId::for_slot(date(2024, 6, 11), slot("08:00")),
        AppointmentId::for_slot(date(2024, 6, 10), slot("19:00")),
        AppointmentId::for_slot(date(2024, 6, 10), slot("09:00")),
    ];
    ids.sort();

    let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec!["2024-06-10_09:00", "2024-06-10_19:00", "2024-06-11_08:00"]
    );
}

#[test]
fn test_appointment_wire_shape() {
    let appointment = Appointment {
        id: AppointmentId::for_slot(date(2024, 6, 10), slot("09:00")),
        date: date(2024, 6, 10),
        time: slot("09:00"),
        name: "Ana".to_string(),
        phone: "555-1111".to_string(),
        reason: String::new(),
        status: AppointmentStatus::Pending,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap(),
    };

    let value = to_value(&appointment).unwrap();
    assert_eq!(
        value,
        json!({
            "id": "2024-06-10_09:00",
            "date": "2024-06-10",
            "time": "09:00",
            "name": "Ana",
            "phone": "555-1111",
            "reason": "",
            "status": "pending",
            "createdAt": "2024-06-01T08:30:00Z",
        })
    );

    let parsed: Appointment = from_str(&value.to_string()).unwrap();
    assert_eq!(parsed, appointment);
}

#[test]
fn test_slot_map_ignores_rejected() {
    let base = Appointment {
        id: AppointmentId::for_slot(date(2024, 6, 10), slot("09:00")),
        date: date(2024, 6, 10),
        time: slot("09:00"),
        name: "Ana".to_string(),
        phone: "555-1111".to_string(),
        reason: String::new(),
        status: AppointmentStatus::Pending,
        created_at: Utc::now(),
    };
    let accepted = Appointment {
        id: AppointmentId::for_slot(date(2024, 6, 10), slot("10:00")),
        time: slot("10:00"),
        status: AppointmentStatus::Accepted,
        ..base.clone()
    };
    let rejected = Appointment {
        id: AppointmentId::for_slot(date(2024, 6, 10), slot("11:00")),
        time: slot("11:00"),
        status: AppointmentStatus::Rejected,
        ..base.clone()
    };

    let map = SlotMap::from_appointments([&base, &accepted, &rejected]);

    assert_eq!(map.len(), 2);
    assert_eq!(map.occupancy(slot("09:00")), Occupancy::Pending);
    assert_eq!(map.occupancy(slot("10:00")), Occupancy::Accepted);
    assert_eq!(map.occupancy(slot("11:00")), Occupancy::Free);
    assert_eq!(
        to_value(&map).unwrap(),
        json!({ "09:00": "pending", "10:00": "accepted" })
    );
}

#[test]
fn test_validate_trims_and_builds_draft() {
    let mut req = request("2024-06-10", "09:00", "  Ana ", " 555-1111 ");
    req.reason = Some("  checkup ".to_string());

    let draft = req.validate(date(2024, 6, 1)).unwrap();

    assert_eq!(draft.id.to_string(), "2024-06-10_09:00");
    assert_eq!(draft.name, "Ana");
    assert_eq!(draft.phone, "555-1111");
    assert_eq!(draft.reason, "checkup");
}

#[rstest]
#[case::blank_name(request("2024-06-10", "09:00", "   ", "555-1111"))]
#[case::blank_phone(request("2024-06-10", "09:00", "Ana", ""))]
#[case::sunday(request("2024-06-16", "09:00", "Ana", "555-1111"))]
#[case::saturday_afternoon(request("2024-06-15", "15:00", "Ana", "555-1111"))]
#[case::before_opening(request("2024-06-10", "07:00", "Ana", "555-1111"))]
#[case::bad_date(request("10/06/2024", "09:00", "Ana", "555-1111"))]
#[case::past(request("2024-05-31", "09:00", "Ana", "555-1111"))]
fn test_validate_rejects(#[case] req: ReservationRequest) {
    assert!(matches!(
        req.validate(date(2024, 6, 1)),
        Err(BookingError::InvalidInput(_))
    ));
}

#[test]
fn test_validate_allows_today() {
    let req = request("2024-06-10", "19:00", "Ana", "555-1111");
    assert!(req.validate(date(2024, 6, 10)).is_ok());
}
