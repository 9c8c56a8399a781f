use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::features::dashboard::dtos::{
    DashboardStatsDto, DashboardTotalsDto, InfractionTypeTotalDto, SectorRemovalsDto,
    ServiceTypeCountDto,
};
use crate::features::reports::models::{Infraction, Report, ServiceType};
use crate::shared::constants::RECENT_REPORTS_LIMIT;

/// Derive summary tiles, chart series and the recent-records slice.
///
/// `reports` must already be newest-first. Infractions not owned by one of `reports`
/// are ignored.
pub fn aggregate(reports: &[Report], infractions: &[Infraction]) -> DashboardStatsDto {
    let report_ids: HashSet<Uuid> = reports.iter().map(|r| r.id).collect();
    let owned: Vec<&Infraction> = infractions
        .iter()
        .filter(|i| i.report_id.is_some_and(|id| report_ids.contains(&id)))
        .collect();

    let car_removals: i64 = reports.iter().map(|r| i64::from(r.car_removals)).sum();
    let motorcycle_removals: i64 = reports
        .iter()
        .map(|r| i64::from(r.motorcycle_removals))
        .sum();

    let totals = DashboardTotalsDto {
        report_count: reports.len() as i64,
        total_approaches: reports.iter().map(|r| i64::from(r.total_approaches)).sum(),
        total_removals: car_removals + motorcycle_removals,
        car_removals,
        motorcycle_removals,
        total_infractions: owned.iter().map(|i| i64::from(i.quantity)).sum(),
    };

    DashboardStatsDto {
        totals,
        service_types: service_type_distribution(reports),
        sectors: sector_breakdown(reports),
        infraction_types: infraction_totals(&owned),
        recent_reports: reports
            .iter()
            .take(RECENT_REPORTS_LIMIT)
            .cloned()
            .map(Into::into)
            .collect(),
    }
}

fn service_type_distribution(reports: &[Report]) -> Vec<ServiceTypeCountDto> {
    let mut order: Vec<ServiceType> = Vec::new();
    let mut counts: HashMap<ServiceType, i64> = HashMap::new();

    for report in reports {
        let count = counts.entry(report.service_type).or_insert_with(|| {
            order.push(report.service_type);
            0
        });
        *count += 1;
    }

    order
        .into_iter()
        .map(|service_type| ServiceTypeCountDto {
            service_type,
            label: service_type.label().to_string(),
            count: counts[&service_type],
        })
        .collect()
}

fn sector_breakdown(reports: &[Report]) -> Vec<SectorRemovalsDto> {
    let mut breakdown: Vec<SectorRemovalsDto> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for report in reports {
        let slot = *index.entry(report.sector.as_str()).or_insert_with(|| {
            breakdown.push(SectorRemovalsDto {
                sector: report.sector.clone(),
                car_removals: 0,
                motorcycle_removals: 0,
                total_removals: 0,
            });
            breakdown.len() - 1
        });
        let entry = &mut breakdown[slot];
        entry.car_removals += i64::from(report.car_removals);
        entry.motorcycle_removals += i64::from(report.motorcycle_removals);
        entry.total_removals += report.total_removals();
    }

    breakdown
}

fn infraction_totals(infractions: &[&Infraction]) -> Vec<InfractionTypeTotalDto> {
    let mut totals: Vec<InfractionTypeTotalDto> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for infraction in infractions {
        let slot = *index
            .entry(infraction.infraction_type.as_str())
            .or_insert_with(|| {
                totals.push(InfractionTypeTotalDto {
                    infraction_type: infraction.infraction_type.clone(),
                    quantity: 0,
                });
                totals.len() - 1
            });
        totals[slot].quantity += i64::from(infraction.quantity);
    }

    totals
}
