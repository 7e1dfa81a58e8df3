//! Prompt templates for the document actions.

/// Shared persona for every document action.
pub const DOCUMENT_SYSTEM: &str = "You are a senior requirements engineer who writes formal software documentation.
Write in a precise, professional register suitable for development and test teams.
Output Markdown directly, without wrapping it in a ```markdown code fence.";

/// Introduction (identification, system overview, document overview).
pub fn srs_introduction_prompt(outline: &str) -> String {
    format!(
        "Using the project outline below, write the \"1. Introduction\" chapter of a software requirements specification following GB/T 8567-2006. Aim for 200-300 words with these subsections:

1.1 Identification
- Identifier (e.g. SRS-ERP-001), full system title, abbreviation, version number and release number.

1.2 System Overview
- Purpose of the system and the problems it solves, its general nature (real-time, distributed, ...), development and maintenance history, stakeholders, operating sites, and related documents.

1.3 Document Overview
- Purpose of this document, a short summary of its chapters, and confidentiality requirements.

Requirements:
- Extract the system name, target users and functional scope from the outline and work them into the text.
- Keep the language formal and the structure clear.

Project outline:
{outline}"
    )
}

/// Overall description (product perspective, functions, users, assumptions).
pub fn srs_overall_description_prompt(outline: &str) -> String {
    format!(
        "Using the project outline below, write the \"2. Overall Description\" chapter of a software requirements specification following GB/T 8567-2006. Aim for 600-800 words with these subsections:

2.1 Product Perspective
- Where the software sits in the wider system and how it relates to other systems (integrations, data exchange).

2.2 Product Functions
- At least 5-7 key functions, grouped by priority or module, each with a one-line description.

2.3 User Characteristics
- User roles, their technical proficiency and their usage scenarios.

2.4 Assumptions and Dependencies
- Operating assumptions and external dependencies (operating systems, databases, third-party APIs).

Requirements:
- Expand the goals, functions and users in the outline into detailed descriptions.
- Use professional terminology throughout.

Project outline:
{outline}"
    )
}

/// Functional requirements, one block per function.
pub fn srs_functional_requirements_prompt(outline: &str) -> String {
    format!(
        "Using the project outline below, write the \"3. Functional Requirements\" chapter of a software requirements specification following GB/T 8567-2006. Aim for 800-1000 words.

Describe at least 5-7 functions, grouped by module or priority. For each function give:
- **Description**: what the function does and why (50-70 words).
- **Inputs/Outputs**: user inputs and system outputs, including formats and ranges.
- **Acceptance Criteria**: measurable or testable conditions for success.
- **Priority**: High / Medium / Low.

Use a `### Function N: <name>` heading for each function.

Project outline:
{outline}"
    )
}

/// Non-functional requirements with quantified targets.
pub fn srs_non_functional_requirements_prompt(outline: &str) -> String {
    format!(
        "Using the project outline below, write the \"4. Non-functional Requirements\" chapter of a software requirements specification following GB/T 8567-2006. Aim for 500-750 words covering:

- Performance: response times, throughput, concurrent users.
- Security: data protection, access control, authentication.
- Availability: availability targets and recovery times.
- Maintainability: logging, modularity, ease of updates.
- Portability: supported operating systems and deployment platforms.

Use quantified targets (times, percentages) wherever possible so each requirement is testable.

Project outline:
{outline}"
    )
}

/// External interface requirements.
pub fn srs_interfaces_prompt(outline: &str) -> String {
    format!(
        "Using the project outline below, write the \"5. External Interface Requirements\" chapter of a software requirements specification following GB/T 8567-2006. Aim for 400-600 words covering:

- User interfaces: GUI, CLI or mobile, and supported clients.
- Hardware interfaces: devices the system talks to and how.
- Software interfaces: APIs, databases and data formats, with latency requirements.
- Communication interfaces: network protocols and bandwidth requirements.

Project outline:
{outline}"
    )
}

/// PlantUML use-case diagram derived from a requirements specification.
pub fn use_case_diagram_prompt(document: &str) -> String {
    format!(
        "From the software requirements specification below, produce a PlantUML script for a UML 2.0 use-case diagram. Output the script directly, without a ```plantuml fence, starting with @startuml and ending with @enduml.

Include:
1. Actors: every user role and external system named in the user characteristics or stakeholder sections, e.g. actor \"Administrator\" as Admin
2. Use cases: at least 7-10 verb-first use cases taken from the functional requirements, e.g. (Manage Inventory)
3. Relationships: actor-to-use-case associations (-->) plus <<include>> and <<extend>> relationships where one function depends on or extends another, e.g. (Log In) .> (Reset Password) : <<extend>>
4. Notes: short notes explaining the purpose or constraints of key use cases, e.g. note right of (Manage Inventory) : Lets administrators review stock levels

Only model actors and functions the document actually mentions, and keep the script syntactically valid.

Software requirements specification:
{document}"
    )
}

/// Rewrite `original` in the format of `standard` without losing content.
pub fn standardize_document_prompt(original: &str, standard: &str) -> String {
    format!(
        "Reformat the document that needs revision so that it follows the standard document below.

Requirements:
1. Keep all of the original document's content. Nothing may be deleted.
2. Apply the standard document's conventions in full: chapter structure, heading levels, paragraph style, list style and terminology.
3. Where the standard document has sections the original lacks, add them and fill them in as far as the original allows.
4. Output Markdown.

The result should use ## second-level headings as the standard does, numbered lists for function descriptions, tables for parameter descriptions, fenced code blocks for code, and bold for key terms.

Standard document:
{standard}

Document to revise:
{original}"
    )
}
