// Copyright @yucwang 2026

pub mod depositer;
pub mod direct;
pub mod optimal_mis;
pub mod path;
pub mod photon_density;
pub mod photon_map;
pub mod volpath;

#[cfg(test)]
pub(crate) mod test_scenes;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::core::bounce_controller::BounceController;
use crate::core::integrator::Integrator;
use crate::core::scene_loader::RenderSettings;

use self::depositer::DepositerIntegrator;
use self::optimal_mis::OptimalMisIntegrator;
use self::path::PathIntegrator;
use self::volpath::VolPathIntegrator;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegratorKind {
    Path,
    VolPath,
    #[serde(rename = "optimal_mis")]
    OptimalMis,
    Depositer,
}

impl IntegratorKind {
    pub const ALL: [IntegratorKind; 4] = [
        IntegratorKind::Path,
        IntegratorKind::VolPath,
        IntegratorKind::OptimalMis,
        IntegratorKind::Depositer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IntegratorKind::Path => "path",
            IntegratorKind::VolPath => "volpath",
            IntegratorKind::OptimalMis => "optimal_mis",
            IntegratorKind::Depositer => "depositer",
        }
    }
}

impl fmt::Display for IntegratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntegratorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(IntegratorKind::Path),
            "volpath" => Ok(IntegratorKind::VolPath),
            "optimal_mis" | "optimalmis" => Ok(IntegratorKind::OptimalMis),
            "depositer" => Ok(IntegratorKind::Depositer),
            other => Err(format!("unknown integrator `{}`; expected one of path, volpath, optimal_mis, depositer", other)),
        }
    }
}

pub fn build_integrator(settings: &RenderSettings) -> Box<dyn Integrator> {
    let controller = BounceController::new(settings.min_bounces, settings.max_bounces);
    match settings.integrator {
        IntegratorKind::Path => Box::new(PathIntegrator::new(controller)),
        IntegratorKind::VolPath => Box::new(VolPathIntegrator::new(controller)),
        IntegratorKind::OptimalMis => Box::new(OptimalMisIntegrator::new(controller, settings.preprocess_samples)),
        IntegratorKind::Depositer => Box::new(DepositerIntegrator::new(controller,
                                                                       settings.photon_count,
                                                                       settings.photon_bounces,
                                                                       settings.search_count)),
    }
}
