mod counting_property_tests;
