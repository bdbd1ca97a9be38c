#![allow(dead_code)]

use chrono::NaiveDate;
use opsboard_drill::DataSources;
use opsboard_model::{Hierarchy, HierarchyRow, Record, TeamConfiguration, TeamPicMapping};

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

/// Two teams; `ann` and `bob` on Alpha, `cho` on Beta. `dee` has no mapping.
pub fn hierarchy() -> Hierarchy {
    let team = |id: &str, name: &str| TeamConfiguration {
        team_id: id.into(),
        team_name: name.into(),
    };
    let pic = |pic: &str, team: &str| TeamPicMapping {
        pic_name: pic.into(),
        team_id: team.into(),
    };
    Hierarchy::new(
        vec![team("t1", "Alpha"), team("t2", "Beta")],
        vec![pic("ann", "t1"), pic("bob", "t1"), pic("cho", "t2")],
    )
}

pub fn zone(
    d: u32,
    pic: &str,
    (pid, pub_name): (&str, &str),
    (mid, media_name): (&str, &str),
    (zid, zone_name): (&str, &str),
    revenue: f64,
) -> HierarchyRow {
    HierarchyRow {
        pic_name: Some(pic.into()),
        pid: Some(pid.into()),
        pub_name: Some(pub_name.into()),
        mid: Some(mid.into()),
        media_name: Some(media_name.into()),
        zid: Some(zid.into()),
        zone_name: Some(zone_name.into()),
        revenue,
        profit: revenue / 10.0,
        requests: revenue * 100.0,
        paid: revenue * 50.0,
        ..HierarchyRow::on(day(d))
    }
}

/// Zone-level rows over three days.
pub fn zones() -> Vec<HierarchyRow> {
    let daily = ("17", "Daily");
    let weekly = ("18", "Weekly");
    let news = ("30", "Newsroom");
    vec![
        zone(1, "ann", daily, ("170", "daily.example"), ("1700", "Top"), 100.0),
        zone(1, "ann", daily, ("170", "daily.example"), ("1701", "Side"), 20.0),
        zone(1, "ann", daily, ("171", "m.daily.example"), ("1710", "Top"), 30.0),
        zone(1, "bob", weekly, ("180", "weekly.example"), ("1800", "Top"), 50.0),
        zone(1, "cho", news, ("300", "news.example"), ("3000", "Top"), 70.0),
        zone(1, "dee", ("40", "Orphan"), ("400", "orphan.example"), ("4000", "Top"), 5.0),
        zone(2, "ann", daily, ("170", "daily.example"), ("1700", "Top"), 110.0),
        zone(2, "bob", weekly, ("180", "weekly.example"), ("1800", "Top"), 40.0),
        zone(2, "cho", news, ("300", "news.example"), ("3000", "Top"), 90.0),
        zone(3, "ann", daily, ("171", "m.daily.example"), ("1710", "Top"), 10.0),
    ]
}

pub fn sources(rows: &[HierarchyRow]) -> DataSources<'_> {
    DataSources::from_zones(rows)
}

pub fn records() -> Vec<Record> {
    vec![
        Record::new().with("market", "US").with("partner", "Acme").with("revenue", 10.0),
        Record::new().with("market", "JP").with("partner", "Acme").with("revenue", 20.0),
        Record::new().with("market", " US ").with("partner", "Globex").with("revenue", 30.0),
        Record::new().with("partner", "Initech").with("revenue", 40.0),
        Record::new().with("market", None::<&str>).with("partner", "Acme").with("revenue", 50.0),
    ]
}
