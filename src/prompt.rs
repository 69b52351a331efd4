//! Prompt assembly for the itinerary narrative
//!
//! Costs are deliberately kept out of the prompts: the model only sees the
//! distance, and the priced table is appended afterwards by
//! [`crate::itinerary::augment`].

use std::fmt::Write as _;

use crate::distance::DistanceResult;
use crate::models::TripPlan;

const LONG_DATE_FORMAT: &str = "%B %-d, %Y";

/// Everything the prompts need to know about a trip
#[derive(Debug, Clone, PartialEq)]
pub struct TripContext {
    pub origin: String,
    pub destination: String,
    pub duration_days: i64,
    pub start_date_long: String,
    pub end_date_long: String,
    pub companions: String,
    pub activities: &'static str,
    pub travelers: u32,
}

impl From<&TripPlan> for TripContext {
    fn from(plan: &TripPlan) -> Self {
        Self {
            origin: plan.origin.clone(),
            destination: plan.destination.clone(),
            duration_days: plan.duration_days(),
            start_date_long: plan.start_date.format(LONG_DATE_FORMAT).to_string(),
            end_date_long: plan.end_date.format(LONG_DATE_FORMAT).to_string(),
            companions: plan.travelers.companions(),
            activities: plan.mood.activities(),
            travelers: plan.travelers.get(),
        }
    }
}

/// "Distance between A and B: 145.30 km", using the one-decimal display distance
#[must_use]
pub fn distance_line(origin: &str, destination: &str, distance: &DistanceResult) -> String {
    format!(
        "Distance between {origin} and {destination}: {:.2} km",
        distance.display_distance_km()
    )
}

#[must_use]
pub fn system_prompt(ctx: &TripContext) -> String {
    let dest = &ctx.destination;
    format!(
        "You are a professional Indian travel planner. Create detailed itineraries using markdown formatting (NO HTML tags).
- Use real restaurant names in {dest} with specific dishes
- Attractions within 100km of {dest}
- Focus on {activities} activities
- Day 1 is journey/arrival day with travel details
- Middle days are full exploration with morning/afternoon/evening structure
- Each exploration day MUST have specific breakfast, lunch, dinner places (NO PRICES)
- Last day is return journey with breakfast and departure
- Use markdown formatting: # for titles, ## for day headers, ### for subsections, ** for bold, - for bullets
- DO NOT include any prices, costs, budget information, or accommodation costs
- DO NOT use HTML tags",
        activities = ctx.activities
    )
}

#[must_use]
pub fn user_prompt(ctx: &TripContext, distance_line: &str) -> String {
    let dest = &ctx.destination;
    let origin = &ctx.origin;
    let days = ctx.duration_days;
    let activities = ctx.activities;

    let mut out = format!(
        "Create a personalized {days}-day trip itinerary for {dest} from {} to {}.
This is for a {} trip focusing on these activities: {activities}.

TRAVEL INFORMATION:
{distance_line}

IMPORTANT: DO NOT include any cost estimates, budget breakdowns, or accommodation prices in your response. Only provide the itinerary, attractions, and restaurant recommendations.

Please include:
1. A brief introduction to {dest} highlighting why it's perfect for this type of trip
2. **TOP 5 MUST-VISIT PLACES** section (REQUIRED - place this right after the introduction)
3. A day-by-day itinerary with clear Morning, Afternoon, and Evening sections for each day
4. At least 5-7 specific attraction recommendations (within 100km of {dest}) with brief descriptions
5. 3-5 restaurant recommendations with specific dishes (DO NOT include prices)
6. 2-3 insider tips that most tourists might not know about

IMPORTANT STRUCTURE:

## 🌟 Top 5 Must-Visit Places

RIGHT AFTER the introduction, include this section with EXACTLY this format:
[MUSTVISIT]
",
        ctx.start_date_long, ctx.end_date_long, ctx.companions
    );
    for n in 1..=5 {
        let _ = writeln!(
            out,
            "{n}. **Place Name** - One line description of why it's unmissable"
        );
    }
    out.push_str("[/MUSTVISIT]\n\n---\n\n");

    let _ = write!(
        out,
        "Day 1 should be: Journey from {origin} to {dest}
- Include travel details and arrival
- Hotel check-in
- Light evening activities

"
    );

    if days >= 3 {
        let last_exploration = days - 1;
        let range = if last_exploration == 2 {
            "Day 2 should be: Exploration day".to_string()
        } else {
            format!("Days 2 to {last_exploration} should be: Exploration days")
        };
        let _ = write!(
            out,
            "{range}
Each day must have:
- **Best place for Breakfast:** (restaurant name, famous dishes - NO PRICES)
- **Morning Activities:** (specific attraction with what it's famous for and what you can do)
- **Best place for Lunch:** (restaurant name, famous dishes - NO PRICES)
- **Afternoon Activities:** (another attraction)
- **Best place for Dinner:** (restaurant name, famous dishes - NO PRICES)

"
        );
    }

    if days >= 2 {
        let _ = write!(
            out,
            "Day {days} should be: Return journey from {dest} back to {origin}
- Breakfast recommendation
- Checkout and departure
- Return travel details

"
        );
    } else {
        out.push_str("This is a same-day trip: include the return journey at the end of Day 1.\n\n");
    }

    let _ = write!(
        out,
        "Format the response with clear markdown formatting:
- Use # for main title (Trip to {dest})
- Use ## for day headers (Day 1: Journey to {dest}, Day 2: Explore [Location], etc.)
- Use ### for section headers (Morning, Afternoon, Evening)
- Use **bold** for restaurant names, attraction names, and important information
- Use bullet points (- ) for lists
- Use --- for section dividers
- Prefix insider tips with \"**Insider Tip:**\"

DO NOT INCLUDE:
- Any prices or costs
- Budget breakdowns
- Accommodation costs
- Transportation costs
- Entry fees

IMPORTANT:
- Make the content detailed and specific to {dest}
- Use real restaurant names in {dest}
- Attractions should be within 100km of {dest}
- Each exploration day must have breakfast, lunch, and dinner recommendations (NO PRICES)
- Day 1 is arrival/journey, last day is departure/return
- DO NOT use HTML tags, use markdown formatting only
- Use ** for bold, # for headers, - for bullets

This is a {days}-day itinerary focused on {activities} for {} travelers.",
        ctx.travelers
    );

    out
}
