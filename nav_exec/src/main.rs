//! Navigation executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Build the grid map from the scenario
//!     - Plan the route (A* then Douglas-Peucker), or take the operator's
//!       precalculated route
//!     - Main loop, until the believed pose is within tolerance of the goal:
//!         - Trajectory control off the believed pose
//!         - Execute the action on the driver
//!         - Advance the particles through the motion model
//!         - Measure, reweight and resample
//!         - Recalculate the believed pose

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

// Internal
use nav_lib::{
    auto::{
        knowledge::KnowledgeParams,
        loc::{LocParams, ParticleFilter, Pose},
        nav::{plan, simplify},
        path::Route,
        sensor::VirtualRangeSensor,
        traj_ctrl::{TrajCtrl, TrajCtrlParams},
    },
    driver::{Driver, DriverMode, SimDriver},
    params::NavExecParams,
    scenario::Scenario,
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Navigation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: NavExecParams =
        util::params::load("nav_exec.toml").wrap_err("Could not load exec params")?;
    let scenario: Scenario =
        util::params::load("scenario.toml").wrap_err("Could not load the scenario")?;
    let knowledge: KnowledgeParams =
        util::params::load("knowledge.toml").wrap_err("Could not load knowledge params")?;
    let loc_params: LocParams =
        util::params::load("loc.toml").wrap_err("Could not load localisation params")?;
    let traj_ctrl_params: TrajCtrlParams =
        util::params::load("traj_ctrl.toml").wrap_err("Could not load trajectory control params")?;

    info!("Parameters loaded");

    // ---- BUILD MAP ----

    let map = scenario.build_map().wrap_err("Failed to build the map")?;

    info!(
        "Map of {}x{} gu with {} obstacles built",
        map.width_gu(),
        map.height_gu(),
        scenario.obstacles.len()
    );

    // ---- PLAN ROUTE ----

    let route = if scenario.use_precalculated_route {
        info!("Using the precalculated route from the scenario");
        scenario.precalculated_route()
    } else {
        info!("Planning route");
        let raw = plan(
            &map,
            scenario.start_point(),
            scenario.goal_point(),
            exec_params.min_clearance_gu,
        )
        .wrap_err("Planning failed")?;
        info!("Planner returned {} points", raw.get_num_points());
        debug!("Raw route: {:?}", raw.points_gu);

        // Reduce the route, points closer than a cell to the reduced route
        // carry no information
        let reduced = Route::new(simplify(
            &raw.points_gu,
            exec_params.simplify_tolerance_gu.max(1.0),
        ));
        info!("Route reduced to {} points", reduced.get_num_points());
        reduced
    };

    debug!("Route: {:?}", route.points_gu);
    session.save("route.json", &route);

    let segments = route.segments();
    if segments.is_empty() {
        return Err(eyre!("The route has no segments to follow"));
    }

    // ---- INITIALISE MODULES ----

    let mut motion_rng = StdRng::seed_from_u64(exec_params.motion_seed);
    let sensor = VirtualRangeSensor::new(&map, &knowledge);
    let mut filter = ParticleFilter::new(loc_params, scenario.start_pose());
    let mut traj_ctrl = TrajCtrl::new(traj_ctrl_params);

    let mut driver = match exec_params.driver_mode {
        DriverMode::Sim => SimDriver::new(
            scenario.start_pose(),
            &map,
            &knowledge,
            exec_params.sim_seed,
        ),
        DriverMode::Hardware => {
            return Err(eyre!(
                "Hardware driver mode is not available in this build, use Sim"
            ))
        }
    };

    info!("Module initialisation complete, beginning main loop\n");

    // ---- MAIN LOOP ----

    let goal = scenario.goal_point().as_vector();
    let mut reference = filter.reference_pose();
    let mut belief_history: Vec<Pose> = vec![reference];
    let mut steps = 0usize;

    while (reference.position_gu - goal).norm() >= exec_params.goal_tolerance_gu {
        if steps >= exec_params.max_steps {
            session.save("belief_history.json", &belief_history);
            return Err(eyre!(
                "Goal not reached within {} steps, aborting",
                exec_params.max_steps
            ));
        }

        // Log where the robot currently believes it is
        info!(
            "Believe: x = {:.0}, y = {:.0}, heading = {:.0} deg",
            reference.position_gu[0],
            reference.position_gu[1],
            reference.heading.degrees()
        );

        // Steering command off the believed pose
        let action = traj_ctrl.control(&reference, &segments);
        debug!(
            "Action: {} deg for {} ms",
            action.steering.degrees(),
            action.duration_ms
        );
        driver
            .execute(&action)
            .wrap_err("Failed to execute the action")?;

        // Advance the belief through the same action
        debug!("Updating particles");
        filter
            .predict(&knowledge, &action, &mut motion_rng)
            .wrap_err("Motion update failed")?;

        // Measure, reweight and resample
        debug!("Resampling");
        let actual_front_cm = driver.measure_front_cm().wrap_err("Front measure failed")?;
        let actual_back_cm = driver.measure_back_cm().wrap_err("Back measure failed")?;
        filter.resample(actual_front_cm, actual_back_cm, &sensor, &mut motion_rng);

        debug!("Calculating new belief");
        reference = filter.reference_pose();
        belief_history.push(reference);
        steps += 1;
    }

    // ---- SHUTDOWN ----

    info!("Reached the goal after {} steps, terminating", steps);
    info!(
        "Final ground truth: {:?} (belief {:?})",
        driver.truth_pose(),
        reference
    );
    session.save("belief_history.json", &belief_history);

    Ok(())
}
