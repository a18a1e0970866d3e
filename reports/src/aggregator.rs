//! Turns the flat rows of a query into the grouped structure served to the
//! dashboard.
//!
//! Every district of the report ordering is present in the output, in order,
//! even when no row matched it. Rows whose (translated) district is not part
//! of the ordering are dropped. Subtotal rows, recognisable by a region label
//! equal to the district label, are handled per `SubtotalPolicy`, and the
//! synthesized totals are placed per `SummaryPolicy`.
//!
//! The grand total sums every row that ends up in a district or is folded
//! into it. Dropped rows never count.

use crate::config::{Layout, ReportDefinition, SubtotalPolicy, TotalSource};
use crate::errors::{QueryError, ReportError};
use crate::metrics_defs::{ROWS_DROPPED, ROWS_SCANNED};
use crate::types::{BrandCount, CountOverflow, OrderedGroups, RawRow, ReportRow};
use shared::counter;
use std::collections::HashMap;

/// Builds a report from rows that were already fetched. Fails only when a
/// sum no longer fits in an `i64`; no partial output is returned.
pub fn build_report<I>(rows: I, definition: &ReportDefinition) -> Result<OrderedGroups, ReportError>
where
    I: IntoIterator<Item = RawRow>,
{
    let mut builder = ReportBuilder::new(definition);
    for row in rows {
        builder.push(row)?;
    }
    builder.finish()
}

/// Incremental form of [`build_report`]: feed rows in upstream order, then
/// call [`ReportBuilder::finish`].
pub struct ReportBuilder<'a> {
    definition: &'a ReportDefinition,
    groups: OrderedGroups,
    summary: ReportRow,
    district_totals: HashMap<String, ReportRow>,
    /// Last subtotal seen per district, with its row index.
    trailing_subtotals: HashMap<String, (usize, ReportRow)>,
    scanned: u64,
    dropped: u64,
}

fn overflow_at(index: usize) -> impl Fn(CountOverflow) -> ReportError {
    move |e| {
        QueryError::Scan {
            index,
            reason: e.to_string(),
        }
        .into()
    }
}

impl<'a> ReportBuilder<'a> {
    pub fn new(definition: &'a ReportDefinition) -> Self {
        ReportBuilder {
            definition,
            groups: OrderedGroups::seeded(definition.ordering.iter().cloned()),
            summary: ReportRow::empty(
                definition.summary_label.clone(),
                definition.brands(),
                definition.nulls,
            ),
            district_totals: HashMap::new(),
            trailing_subtotals: HashMap::new(),
            scanned: 0,
            dropped: 0,
        }
    }

    pub fn push(&mut self, raw: RawRow) -> Result<(), ReportError> {
        let index = self.scanned as usize;
        self.scanned += 1;
        let definition = self.definition;
        let overflow = overflow_at(index);

        let district = definition
            .district_labels
            .translate(&raw.district)
            .to_string();
        let region_name = match &raw.region {
            Some(region) => definition.region_labels.translate(region).to_string(),
            None => district.clone(),
        };

        let row = self.to_report_row(region_name, &raw).map_err(&overflow)?;

        let Some(rows) = self.groups.get_mut(&district) else {
            tracing::debug!(
                report = %definition.name,
                district = %district,
                region = %row.region_name,
                "Dropping row for district outside the report ordering"
            );
            self.dropped += 1;
            return Ok(());
        };

        let is_subtotal =
            definition.columns.shape == Layout::Regional && row.region_name == district;

        if is_subtotal {
            match definition.subtotal {
                SubtotalPolicy::Trailing => {
                    // Only one subtotal per district is kept; a repeated one replaces the
                    // first. It joins the grand total in `finish`.
                    self.trailing_subtotals.insert(district, (index, row));
                }
                SubtotalPolicy::Folded => {
                    self.summary.accumulate(&row).map_err(&overflow)?;
                }
                SubtotalPolicy::InPlace => {
                    self.summary.accumulate(&row).map_err(&overflow)?;
                    rows.push(row);
                }
            }
            return Ok(());
        }

        self.summary.accumulate(&row).map_err(&overflow)?;
        if definition.summary.per_district() {
            self.district_totals
                .entry(district)
                .or_insert_with_key(|district| {
                    ReportRow::empty(district.clone(), definition.brands(), definition.nulls)
                })
                .accumulate(&row)
                .map_err(&overflow)?;
        }
        rows.push(row);
        Ok(())
    }

    /// Appends the synthesized rows and returns the finished report.
    pub fn finish(mut self) -> Result<OrderedGroups, ReportError> {
        let definition = self.definition;

        for district in definition.ordering.iter() {
            let Some(rows) = self.groups.get_mut(district) else {
                continue;
            };
            if let Some((index, subtotal)) = self.trailing_subtotals.remove(district) {
                self.summary
                    .accumulate(&subtotal)
                    .map_err(overflow_at(index))?;
                rows.push(subtotal);
            }
            if let Some(total) = self.district_totals.remove(district) {
                rows.push(total);
            }
        }

        if definition.summary.front() {
            self.groups
                .insert_front(definition.summary_label.clone(), vec![self.summary]);
        }

        counter!(ROWS_SCANNED, "report" => definition.name.clone()).increment(self.scanned);
        if self.dropped > 0 {
            counter!(ROWS_DROPPED, "report" => definition.name.clone()).increment(self.dropped);
        }

        Ok(self.groups)
    }

    fn to_report_row(&self, region_name: String, raw: &RawRow) -> Result<ReportRow, CountOverflow> {
        let definition = self.definition;
        let market = raw.counts_sum()?;
        let total = match definition.total {
            // Validation guarantees a total column; a missing value falls back to the sum.
            TotalSource::Upstream => raw.total.unwrap_or(market),
            TotalSource::Recomputed => market,
        };

        Ok(ReportRow {
            region_name,
            counts: definition
                .brands()
                .iter()
                .map(|brand| {
                    let count = raw.counts.get(brand).copied().unwrap_or(BrandCount::NULL);
                    (*brand, count.coerce(definition.nulls))
                })
                .collect(),
            total,
            total_market: definition.total_market.then_some(market),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OrderingCatalog, OrderingRef, ReportConfig};
    use crate::translation::{LabelCatalog, LabelTranslationTable};
    use crate::types::{Brand, BrandCounts, NullPolicy};
    use serde_json::json;

    fn definition(yaml: &str) -> ReportDefinition {
        let config: ReportConfig = serde_yaml::from_str(yaml).unwrap();
        config
            .resolve("test", &LabelCatalog::builtin(), &OrderingCatalog::builtin())
            .unwrap()
    }

    fn counts(values: &[(Brand, Option<i64>)]) -> BrandCounts {
        values
            .iter()
            .map(|(brand, count)| (*brand, BrandCount::from(*count)))
            .collect()
    }

    fn raw(district: &str, region: &str, values: &[(Brand, Option<i64>)], total: i64) -> RawRow {
        RawRow {
            district: district.to_string(),
            region: Some(region.to_string()),
            counts: counts(values),
            total: Some(total),
        }
    }

    fn district_row(district: &str, values: &[(Brand, Option<i64>)], total: i64) -> RawRow {
        RawRow {
            district: district.to_string(),
            region: None,
            counts: counts(values),
            total: Some(total),
        }
    }

    #[test]
    fn test_every_ordered_district_is_present() {
        let definition = definition("brands: [FAW]");
        let report = build_report(Vec::new(), &definition).unwrap();

        let keys: Vec<_> = report.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                "Central",
                "North West",
                "Volga",
                "South",
                "North Caucasian",
                "Ural",
                "Siberia",
                "Far East"
            ]
        );
        assert!(report.iter().all(|(_, rows)| rows.is_empty()));
    }

    #[test]
    fn test_folded_subtotal_scenario() {
        let definition = definition(
            r#"
brands: [DONGFENG, FAW]
ordering: [Central]
subtotal: folded
summary: front
total: recomputed
"#,
        );

        let rows = vec![
            raw(
                "Central",
                "Central",
                &[(Brand::Dongfeng, Some(5)), (Brand::Faw, None)],
                5,
            ),
            raw(
                "Central",
                "Moscow Region",
                &[(Brand::Dongfeng, Some(3)), (Brand::Faw, Some(2))],
                5,
            ),
        ];

        let report = build_report(rows, &definition).unwrap();
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "Summary": [
                    {"region_name": "Summary", "dongfeng": 8, "faw": 2, "total": 10}
                ],
                "Central": [
                    {"region_name": "Moscow Region", "dongfeng": 3, "faw": 2, "total": 5}
                ]
            })
        );
        let keys: Vec<_> = report.keys().cloned().collect();
        assert_eq!(keys, vec!["Summary", "Central"]);
    }

    #[test]
    fn test_unseeded_district_is_dropped() {
        let definition = definition("brands: [FAW]\nsummary: front");
        let rows = vec![
            raw("Kaliningrad Oblast", "Kaliningrad", &[(Brand::Faw, Some(7))], 7),
            raw(
                "Центральный Федеральный Округ",
                "Тульская область",
                &[(Brand::Faw, Some(1))],
                1,
            ),
        ];

        let report = build_report(rows, &definition).unwrap();
        assert!(!report.contains("Kaliningrad Oblast"));
        assert_eq!(report.get("Central").unwrap().len(), 1);
        assert_eq!(report.get("Central").unwrap()[0].region_name, "Tula Region");

        // The dropped row does not reach the grand total either.
        let summary = &report.get("Summary").unwrap()[0];
        assert_eq!(summary.counts[&Brand::Faw].get(), Some(1));
        assert_eq!(summary.total, 1);
    }

    #[test]
    fn test_untranslated_district_matching_ordering() {
        let definition = definition("brands: [FAW]");
        let rows = vec![raw("Volga", "Samara", &[(Brand::Faw, Some(2))], 2)];

        let report = build_report(rows, &definition).unwrap();
        let volga = report.get("Volga").unwrap();
        assert_eq!(volga.len(), 1);
        assert_eq!(volga[0].region_name, "Samara");
    }

    #[test]
    fn test_trailing_subtotal_goes_last() {
        let definition = definition("brands: [FAW, HOWO]\nsubtotal: trailing");
        let rows = vec![
            raw(
                "Центральный Федеральный Округ",
                "Центральный Федеральный Округ",
                &[(Brand::Faw, Some(4)), (Brand::Howo, None)],
                4,
            ),
            raw(
                "Центральный Федеральный Округ",
                "Московская область",
                &[(Brand::Faw, Some(3)), (Brand::Howo, None)],
                3,
            ),
            raw(
                "Центральный Федеральный Округ",
                "Тульская область",
                &[(Brand::Faw, Some(1)), (Brand::Howo, None)],
                1,
            ),
        ];

        let report = build_report(rows, &definition).unwrap();
        let names: Vec<_> = report
            .get("Central")
            .unwrap()
            .iter()
            .map(|row| row.region_name.as_str())
            .collect();
        assert_eq!(names, vec!["Moscow Region", "Tula Region", "Central"]);
        assert!(report.get("Central").unwrap()[2].counts[&Brand::Howo].is_null());
    }

    #[test]
    fn test_in_place_subtotal_keeps_position() {
        let definition = definition("brands: [FAW]");
        let rows = vec![
            raw("Ural", "Ural", &[(Brand::Faw, Some(2))], 2),
            raw("Ural", "Kurgan Region", &[(Brand::Faw, Some(2))], 2),
        ];

        let report = build_report(rows, &definition).unwrap();
        let names: Vec<_> = report
            .get("Ural")
            .unwrap()
            .iter()
            .map(|row| row.region_name.as_str())
            .collect();
        assert_eq!(names, vec!["Ural", "Kurgan Region"]);
    }

    #[test]
    fn test_per_district_totals() {
        let definition = definition("brands: [FAW, SITRAK]\nsummary: per_district");
        let rows = vec![
            raw("South", "Rostov Region", &[(Brand::Faw, Some(2)), (Brand::Sitrak, None)], 2),
            raw("South", "Krasnodar Krai", &[(Brand::Faw, Some(5)), (Brand::Sitrak, None)], 5),
            raw("Ural", "Kurgan Region", &[(Brand::Faw, None), (Brand::Sitrak, Some(1))], 1),
        ];

        let report = build_report(rows, &definition).unwrap();
        assert!(!report.contains("Summary"));

        let south = report.get("South").unwrap();
        assert_eq!(south.len(), 3);
        let total = &south[2];
        assert_eq!(total.region_name, "South");
        assert_eq!(total.counts[&Brand::Faw].get(), Some(7));
        assert!(total.counts[&Brand::Sitrak].is_null());
        assert_eq!(total.total, 7);

        let ural = report.get("Ural").unwrap();
        assert_eq!(ural[1].counts[&Brand::Sitrak].get(), Some(1));
        assert!(ural[1].counts[&Brand::Faw].is_null());

        // Districts without rows get no synthesized total.
        assert!(report.get("Central").unwrap().is_empty());
    }

    #[test]
    fn test_district_layout_with_front_summary() {
        let definition = definition(
            r#"
brands: [FAW, HOWO]
layout: district
summary: front
nulls: zero
"#,
        );
        let rows = vec![
            district_row(
                "Центральный Федеральный Округ",
                &[(Brand::Faw, Some(10)), (Brand::Howo, Some(2))],
                15,
            ),
            district_row(
                "Сибирский Федеральный Округ",
                &[(Brand::Faw, None), (Brand::Howo, Some(1))],
                1,
            ),
        ];

        let report = build_report(rows, &definition).unwrap();
        assert_eq!(report.len(), 9);

        let central = &report.get("Central").unwrap()[0];
        assert_eq!(central.region_name, "Central");
        // The upstream total is trusted as-is.
        assert_eq!(central.total, 15);

        let siberia = &report.get("Siberia").unwrap()[0];
        assert_eq!(siberia.counts[&Brand::Faw], BrandCount::ZERO);

        let summary = &report.get("Summary").unwrap()[0];
        assert_eq!(summary.counts[&Brand::Faw].get(), Some(10));
        assert_eq!(summary.counts[&Brand::Howo].get(), Some(3));
        assert_eq!(summary.total, 16);
    }

    #[test]
    fn test_summary_stays_null_without_contributions() {
        let definition = definition("brands: [FAW, JAC]\nsummary: front");
        let rows = vec![raw("Volga", "Samara", &[(Brand::Faw, Some(1)), (Brand::Jac, None)], 1)];

        let report = build_report(rows, &definition).unwrap();
        let summary = &report.get("Summary").unwrap()[0];
        assert!(summary.counts[&Brand::Jac].is_null());
        assert_eq!(summary.counts[&Brand::Faw].get(), Some(1));

        let definition = definition_with_zero_nulls();
        let report = build_report(Vec::new(), &definition).unwrap();
        let summary = &report.get("Summary").unwrap()[0];
        assert_eq!(summary.counts[&Brand::Jac], BrandCount::ZERO);
    }

    fn definition_with_zero_nulls() -> ReportDefinition {
        definition("brands: [FAW, JAC]\nsummary: front\nnulls: zero")
    }

    #[test]
    fn test_recomputed_total_and_total_market() {
        let definition = definition("brands: [FAW, HOWO]\ntotal_market: true");
        let rows = vec![raw(
            "Volga",
            "Samara",
            &[(Brand::Faw, Some(3)), (Brand::Howo, None)],
            99,
        )];

        let report = build_report(rows, &definition).unwrap();
        let row = &report.get("Volga").unwrap()[0];
        assert_eq!(row.total, 99);
        assert_eq!(row.total_market, Some(3));

        let definition = self::definition("brands: [FAW, HOWO]\ntotal: recomputed");
        let rows = vec![raw(
            "Volga",
            "Samara",
            &[(Brand::Faw, Some(3)), (Brand::Howo, None)],
            99,
        )];
        let report = build_report(rows, &definition).unwrap();
        let row = &report.get("Volga").unwrap()[0];
        assert_eq!(row.total, 3);
        assert_eq!(row.total_market, None);
    }

    #[test]
    fn test_recomputed_total_equals_brand_sum() {
        let definition = definition("brands: [DONGFENG, FAW, JAC, OTHER]\ntotal: recomputed");
        let rows = vec![
            raw(
                "Volga",
                "Samara",
                &[
                    (Brand::Dongfeng, None),
                    (Brand::Faw, Some(4)),
                    (Brand::Jac, Some(0)),
                    (Brand::Other, Some(9)),
                ],
                0,
            ),
            raw("Volga", "Penza", &[(Brand::Dongfeng, None)], 0),
        ];

        let report = build_report(rows, &definition).unwrap();
        for row in report.get("Volga").unwrap() {
            let sum: i64 = row.counts.values().map(BrandCount::or_zero).sum();
            assert_eq!(sum, row.total);
        }
        // Brands missing from the raw row are reported as null columns.
        let penza = &report.get("Volga").unwrap()[1];
        assert_eq!(penza.counts.len(), 4);
        assert!(penza.counts[&Brand::Other].is_null());
    }

    #[test]
    fn test_grand_total_matches_retained_rows() {
        let definition = definition("brands: [FAW, HOWO]\nsummary: front\nsubtotal: trailing");
        let rows = vec![
            raw("Central", "Tula Region", &[(Brand::Faw, Some(1)), (Brand::Howo, Some(2))], 3),
            raw("Central", "Central", &[(Brand::Faw, Some(1)), (Brand::Howo, Some(2))], 3),
            raw("Atlantis", "Atlantis", &[(Brand::Faw, Some(50)), (Brand::Howo, None)], 50),
            raw("Far East", "Amur Region", &[(Brand::Faw, None), (Brand::Howo, Some(4))], 4),
        ];

        let report = build_report(rows, &definition).unwrap();
        let mut faw = 0;
        let mut howo = 0;
        let mut total = 0;
        for (district, rows) in report.iter() {
            if district == "Summary" {
                continue;
            }
            for row in rows {
                faw += row.counts[&Brand::Faw].or_zero();
                howo += row.counts[&Brand::Howo].or_zero();
                total += row.total;
            }
        }

        let summary = &report.get("Summary").unwrap()[0];
        assert_eq!(summary.counts[&Brand::Faw].or_zero(), faw);
        assert_eq!(summary.counts[&Brand::Howo].or_zero(), howo);
        assert_eq!(summary.total, total);
    }

    #[test]
    fn test_both_summaries() {
        let definition = definition("brands: [FAW]\nsummary: both\nsummary_label: TOTAL");
        let rows = vec![
            raw("Volga", "Samara", &[(Brand::Faw, Some(1))], 1),
            raw("Volga", "Penza", &[(Brand::Faw, Some(2))], 2),
        ];

        let report = build_report(rows, &definition).unwrap();
        assert_eq!(report.keys().next().unwrap(), "TOTAL");
        assert_eq!(report.get("TOTAL").unwrap()[0].total, 3);
        assert_eq!(report.get("Volga").unwrap()[2].region_name, "Volga");
        assert_eq!(report.get("Volga").unwrap()[2].total, 3);
    }

    #[test]
    fn test_custom_tables() {
        let mut labels = LabelCatalog::empty();
        labels.insert("d", LabelTranslationTable::from_pairs([("ЦФО", "Center")]));
        labels.insert("r", LabelTranslationTable::from_pairs([("Тула", "Tula")]));
        let config: ReportConfig = serde_yaml::from_str(
            "brands: [GAZ]\ndistrict_labels: d\nregion_labels: r\nordering: [Center]",
        )
        .unwrap();
        let definition = config
            .resolve("custom", &labels, &OrderingCatalog::default())
            .unwrap();
        assert_eq!(definition.ordering.as_ref(), ["Center".to_string()]);
        assert!(matches!(config.ordering, OrderingRef::Inline(_)));

        let report = build_report(vec![raw("ЦФО", "Тула", &[(Brand::Gaz, Some(1))], 1)], &definition)
            .unwrap();
        assert_eq!(report.get("Center").unwrap()[0].region_name, "Tula");
    }

    #[test]
    fn test_idempotent() {
        let definition = definition("brands: [FAW, HOWO]\nsummary: both\nsubtotal: trailing");
        let rows = vec![
            raw("Central", "Tula Region", &[(Brand::Faw, Some(1))], 1),
            raw("Central", "Central", &[(Brand::Faw, Some(1))], 1),
            raw("Ural", "Kurgan Region", &[(Brand::Howo, Some(2))], 2),
        ];

        let first = serde_json::to_string(&build_report(rows.clone(), &definition).unwrap()).unwrap();
        let second = serde_json::to_string(&build_report(rows, &definition).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_repeated_trailing_subtotal_counts_once() {
        let definition = definition("brands: [FAW]\nsubtotal: trailing\nsummary: front");
        let rows = vec![
            raw("Central", "Central", &[(Brand::Faw, Some(4))], 4),
            raw("Central", "Tula Region", &[(Brand::Faw, Some(1))], 1),
            raw("Central", "Central", &[(Brand::Faw, Some(6))], 6),
        ];

        let report = build_report(rows, &definition).unwrap();
        let central = report.get("Central").unwrap();
        assert_eq!(central.len(), 2);
        assert_eq!(central[1].total, 6);

        let summary = &report.get("Summary").unwrap()[0];
        assert_eq!(summary.total, 7);
        assert_eq!(summary.counts[&Brand::Faw].get(), Some(7));
    }

    #[test]
    fn test_count_overflow_fails_the_report() {
        let definition = definition("brands: [FAW]\nsummary: front");
        let rows = vec![
            raw("Volga", "Samara", &[(Brand::Faw, Some(i64::MAX))], 1),
            raw("Volga", "Penza", &[(Brand::Faw, Some(1))], 1),
        ];
        let err = build_report(rows, &definition).unwrap_err();
        assert!(matches!(err, ReportError::Query(QueryError::Scan { index: 1, .. })));

        // A single row whose brand columns cannot be summed.
        let definition = self::definition("brands: [FAW, HOWO]");
        let rows = vec![raw(
            "Volga",
            "Samara",
            &[(Brand::Faw, Some(i64::MAX)), (Brand::Howo, Some(i64::MAX))],
            1,
        )];
        let err = build_report(rows, &definition).unwrap_err();
        assert!(matches!(err, ReportError::Query(QueryError::Scan { index: 0, .. })));

        // Trailing subtotals are summed when the report is finished.
        let definition = self::definition("brands: [FAW]\nsummary: front\nsubtotal: trailing");
        let rows = vec![
            raw("Volga", "Samara", &[(Brand::Faw, Some(i64::MAX))], 1),
            raw("Volga", "Volga", &[(Brand::Faw, Some(1))], 1),
        ];
        let err = build_report(rows, &definition).unwrap_err();
        assert!(matches!(err, ReportError::Query(QueryError::Scan { index: 1, .. })));
    }

    #[test]
    fn test_zero_nulls_in_rows() {
        let definition = definition("brands: [FAW, HOWO]\nnulls: zero");
        let rows = vec![raw("Volga", "Samara", &[(Brand::Faw, Some(1)), (Brand::Howo, None)], 1)];
        let report = build_report(rows, &definition).unwrap();
        let row = &report.get("Volga").unwrap()[0];
        assert_eq!(row.counts[&Brand::Howo], BrandCount::ZERO);
        assert_eq!(definition.nulls, NullPolicy::Zero);
    }
}
