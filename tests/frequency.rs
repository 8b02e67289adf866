use alignment_graph::{
    graph::{GraphBuilder, GraphError, Link, NodeId, SelectionType},
    ontology::{vocab, PropertyShape},
    tests_cfg::{
        self, AGENT, EMPLOYEE, KNOWS, ORGANIZATION, OWNS, PEOPLE_NS, PERSON, RELATED, WORKS_FOR,
        X, Y,
    },
};
use rstest::{fixture, rstest};

#[fixture]
fn builder() -> GraphBuilder {
    tests_cfg::builder_with(tests_cfg::people_oracle(), tests_cfg::manual_settings())
}

fn add_class(builder: &mut GraphBuilder, uri: &str) -> NodeId {
    let node = tests_cfg::class_node(builder, uri);
    builder.add_node(node).expect("class node")
}

fn relate(builder: &mut GraphBuilder, source: &NodeId, target: &NodeId, uri: &str, shape: PropertyShape) {
    builder
        .add_link(
            Link::object_property(source.clone(), target.clone(), uri, shape),
            None,
        )
        .expect("link");
}

#[rstest]
#[case::direct(PERSON, ORGANIZATION, WORKS_FOR, SelectionType::FallbackDirect)]
#[case::indirect(EMPLOYEE, ORGANIZATION, WORKS_FOR, SelectionType::FallbackIndirect)]
#[case::range_before_domain(EMPLOYEE, PERSON, KNOWS, SelectionType::FallbackWithOnlyRange)]
#[case::domain_only(AGENT, ORGANIZATION, OWNS, SelectionType::FallbackWithOnlyDomain)]
#[case::unconstrained(ORGANIZATION, AGENT, RELATED, SelectionType::FallbackWithoutDomainAndRange)]
fn empty_counters_fall_back_to_the_most_specific_category(
    builder: GraphBuilder,
    #[case] source: &str,
    #[case] target: &str,
    #[case] link_uri: &str,
    #[case] selection: SelectionType,
) {
    let frequency = builder
        .more_frequent_link_between(source, target)
        .expect("candidate");
    assert_eq!(frequency.link_uri, link_uri);
    assert_eq!(frequency.selection, selection);
    assert!(frequency.selection.is_fallback());
    assert_eq!(frequency.count, 0);
}

#[test]
fn subclass_is_the_last_fallback() {
    let builder = tests_cfg::builder(tests_cfg::end_to_end_oracle());

    let frequency = builder
        .more_frequent_link_between(X, Y)
        .expect("subclass candidate");
    assert_eq!(frequency.link_uri, vocab::RDFS_SUBCLASS_OF);
    assert_eq!(frequency.selection, SelectionType::FallbackSubClass);

    let err = builder
        .more_frequent_link_between(Y, X)
        .expect_err("nothing links Y to X");
    assert!(matches!(err, GraphError::NoCandidateLink { .. }));
}

#[rstest]
fn most_specific_counter_wins(mut builder: GraphBuilder) {
    let person = add_class(&mut builder, PERSON);
    let other = add_class(&mut builder, PERSON);
    let org = add_class(&mut builder, ORGANIZATION);
    relate(&mut builder, &person, &org, WORKS_FOR, PropertyShape::Direct);
    relate(&mut builder, &other, &org, WORKS_FOR, PropertyShape::Direct);
    relate(&mut builder, &person, &org, OWNS, PropertyShape::DomainOnly);

    let frequency = builder
        .more_frequent_link_between(PERSON, ORGANIZATION)
        .expect("counted");
    assert_eq!(frequency.link_uri, WORKS_FOR);
    assert_eq!(frequency.selection, SelectionType::DomainLinkRange);
    assert_eq!(frequency.count, 2);

    // no counter mentions Employee as a domain, the range tier decides
    let frequency = builder
        .more_frequent_link_between(EMPLOYEE, ORGANIZATION)
        .expect("counted");
    assert_eq!(frequency.link_uri, WORKS_FOR);
    assert_eq!(frequency.selection, SelectionType::LinkRange);
    assert_eq!(frequency.count, 2);
}

#[rstest]
fn ties_keep_the_first_candidate(mut builder: GraphBuilder) {
    let person = add_class(&mut builder, PERSON);
    let org = add_class(&mut builder, ORGANIZATION);
    relate(&mut builder, &person, &org, OWNS, PropertyShape::DomainOnly);
    relate(&mut builder, &person, &org, WORKS_FOR, PropertyShape::Direct);

    let frequency = builder
        .more_frequent_link_between(PERSON, ORGANIZATION)
        .expect("counted");
    assert_eq!(frequency.link_uri, WORKS_FOR);
    assert_eq!(frequency.count, 1);
}

#[rstest]
fn counters_survive_link_removal(mut builder: GraphBuilder) {
    let person = add_class(&mut builder, PERSON);
    let org = add_class(&mut builder, ORGANIZATION);
    relate(&mut builder, &person, &org, WORKS_FOR, PropertyShape::Direct);
    let id = builder.links().next().expect("link").id().clone();
    builder.remove_link(id.as_str()).expect("removed");

    let counters: Vec<String> = builder
        .frequencies()
        .iter()
        .map(|(key, count)| format!("{} {count}", key.to_string().replace(PEOPLE_NS, "people:")))
        .collect();
    insta::assert_snapshot!(counters.join("\n"), @r"
    domain:people:Person,link:people:worksFor,range:people:Organization 1
    range:people:Organization,link:people:worksFor 1
    domain:people:Person,link:people:worksFor 1
    link:people:worksFor 1
    ");
}
