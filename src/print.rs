//! Tabulation of rosters and expected points for the console.

use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};

use crate::roster::{talent_bonus, Roster, Snapshot};
use crate::scoring::Breakdown;

fn numeric_col(min_width: usize) -> Col {
    Col::new(Styles::default().with(MinWidth(min_width)).with(HAlign::Right))
}

/// Members of a roster, with the talent bonus and the totals in closing rows.
pub fn tabulate_roster(roster: &Roster, talent_multiplier: f64) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(20))),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Centred)),
            numeric_col(12),
            numeric_col(10),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec!["Member".into(), "Role".into(), "Cost".into(), "Points".into()],
        ));

    for entrant in roster.entrants {
        let role = if std::ptr::eq(entrant, roster.talent) {
            "talent"
        } else {
            "driver"
        };
        table.push_row(Row::new(
            Styles::default(),
            vec![
                entrant.name.clone().into(),
                role.into(),
                format!("{:.1}", entrant.cost).into(),
                format!("{:.3}", entrant.points).into(),
            ],
        ));
    }
    table.push_row(Row::new(
        Styles::default(),
        vec![
            roster.team.name.clone().into(),
            "team".into(),
            format!("{:.1}", roster.team.cost).into(),
            format!("{:.3}", roster.team.points).into(),
        ],
    ));
    table.push_row(Row::new(
        Styles::default().with(Separator(true)),
        vec![
            format!("{} bonus", roster.talent.name).into(),
            "".into(),
            "".into(),
            format!("{:.3}", talent_bonus(roster.talent, talent_multiplier)).into(),
        ],
    ));
    table.push_row(Row::new(
        Styles::default().with(Header(true)),
        vec![
            "Total".into(),
            "".into(),
            format!("{:.1}", roster.cost).into(),
            format!("{:.3}", roster.points).into(),
        ],
    ));
    table
}

/// Expected points of each member by category, alongside its cost per point.
pub fn tabulate_breakdowns(rows: &[(&Snapshot, &Breakdown)]) -> Table {
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![Col::new(Styles::default().with(MinWidth(20)))];
            for _ in 0..7 {
                cols.push(numeric_col(11));
            }
            cols.push(numeric_col(12));
            cols
        })
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            [
                "Member",
                "Qualifying",
                "Race",
                "Completion",
                "Overtake",
                "Teammate",
                "Improvement",
                "Total",
                "Cost/point",
            ]
            .into_iter()
            .map(Into::into)
            .collect(),
        ));

    for (snapshot, breakdown) in rows {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                snapshot.name.clone().into(),
                format!("{:.3}", breakdown.qualifying).into(),
                format!("{:.3}", breakdown.race).into(),
                format!("{:.3}", breakdown.completion).into(),
                format!("{:.3}", breakdown.overtake).into(),
                format!("{:.3}", breakdown.teammate).into(),
                format!("{:.3}", breakdown.improvement).into(),
                format!("{:.3}", breakdown.total()).into(),
                format!("{:.1}", snapshot.cost_per_point()).into(),
            ],
        ));
    }
    table
}
