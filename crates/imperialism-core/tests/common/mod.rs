#![allow(dead_code)]

use imperialism_core::{load_rules, RulesSource, ServerScenario, Workforce};
use imperialism_protocol::{NationId, ProvinceId, TilePosition, WorkforceId, WorkforceType};

pub const A: NationId = NationId(1);
pub const B: NationId = NationId(2);

/// 10 rows by 16 columns of plain. Row 0 is sea; columns 0-7 belong to B,
/// columns 8-15 to A.
pub fn scenario() -> ServerScenario {
    let rules = load_rules(RulesSource::Embedded).unwrap();
    let plain = rules.terrain_id("Plain").unwrap();
    let mut scenario = ServerScenario::new(10, 16, rules).unwrap();
    scenario.add_nation(A, "A").unwrap();
    scenario.add_nation(B, "B").unwrap();
    scenario
        .add_province(ProvinceId::new(1), "Westland", Some(B))
        .unwrap();
    scenario
        .add_province(ProvinceId::new(2), "Eastland", Some(A))
        .unwrap();
    for row in 1..10 {
        for column in 0..16 {
            let position = TilePosition::new(row, column);
            let province = if column < 8 { 1 } else { 2 };
            scenario.set_terrain(position, plain).unwrap();
            scenario
                .set_province(position, Some(ProvinceId::new(province)))
                .unwrap();
        }
    }
    scenario
}

pub fn add(
    scenario: &mut ServerScenario,
    raw: u128,
    row: i32,
    column: i32,
    nation: NationId,
    kind: WorkforceType,
) -> Workforce {
    let workforce = Workforce::new(WorkforceId::from_u128(raw), row, column, nation, kind);
    scenario
        .get_nation_asset_mut(nation)
        .unwrap()
        .add_or_update_workforce(workforce.clone())
        .unwrap();
    workforce
}
